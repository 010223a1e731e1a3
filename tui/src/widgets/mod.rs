//! Widgets

pub mod toast;

pub use toast::ToastWidget;
