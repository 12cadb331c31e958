//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod health;
pub mod links;
pub mod profiles;
pub mod users;

pub use auth::{login_handler, logout_handler, refresh_handler, register_handler};
pub use health::health_handler;
pub use links::{
    click_link_handler, create_link_handler, delete_link_handler, get_link_handler,
    list_links_handler, public_links_handler, reorder_links_handler, update_link_handler,
};
pub use profiles::{
    my_profile_handler, profile_by_username_handler, update_profile_handler,
    update_social_links_handler, upload_avatar_handler,
};
pub use users::{delete_me_handler, me_handler, update_me_handler, user_by_username_handler};
