//! Route paths, relative to [`API_PREFIX`].

pub const API_PREFIX: &str = "/api/v1.0";

pub const BODIES: &str = "/bodies";
pub const BODY: &str = "/bodies/{star_id}";
pub const PLANETS: &str = "/bodies/{star_id}/planets";
pub const PLANET: &str = "/bodies/{star_id}/planets/{planet_id}";

pub const REGISTER: &str = "/register";
pub const REGISTER_ADMIN: &str = "/register_admin";
pub const LOGIN: &str = "/login";
pub const LOGOUT: &str = "/logout";

pub const ACCOUNTS: &str = "/accounts";
/// `GET` takes a username, `DELETE` a user id.
pub const ACCOUNT: &str = "/accounts/{account}";

pub const LOGS: &str = "/logs";
pub const USER_ACTIVITY: &str = "/logs/user_activity";
/// `GET` takes a username, `DELETE` a log id.
pub const LOG: &str = "/logs/{key}";
