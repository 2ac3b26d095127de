pub mod app_user;
pub mod catalog_item;
pub mod category;
pub mod category_field;
pub mod field_option;
pub mod form_submission;
pub mod form_value;
pub mod ui_action;
pub mod ui_component;
pub mod ui_screen;
