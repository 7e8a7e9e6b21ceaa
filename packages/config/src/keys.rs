// ABOUTME: Preference key names and boot-time defaults
// ABOUTME: Seeded into the preference store without overriding operator values

pub const POLL_TIME: &str = "poll_time";
pub const URL: &str = "url";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const ROUTER: &str = "router";
pub const NOTIFICATION: &str = "notification";
pub const NOTIFICATION_TO: &str = "notification_to";
pub const SMTP_SERVER: &str = "smtp_server";
pub const SMTP_PORT: &str = "smtp_port";
pub const SMTP_USER: &str = "smtp_user";
pub const SMTP_PASS: &str = "smtp_pass";

/// A preference seeded at boot when the operator has not set one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPreference {
    pub name: &'static str,
    pub value: &'static str,
    pub secure: bool,
}

const fn plain(name: &'static str, value: &'static str) -> DefaultPreference {
    DefaultPreference {
        name,
        value,
        secure: false,
    }
}

const fn secure(name: &'static str, value: &'static str) -> DefaultPreference {
    DefaultPreference {
        name,
        value,
        secure: true,
    }
}

/// Defaults in seeding order
pub const DEFAULT_PREFERENCES: &[DefaultPreference] = &[
    plain(POLL_TIME, "60"),
    plain(URL, "http://192.168.1.1"),
    secure(USERNAME, "admin"),
    secure(PASSWORD, "admin"),
    plain(ROUTER, "asuswrt"),
    plain(NOTIFICATION, "verizon"),
    plain(NOTIFICATION_TO, "555-123-6789"),
    plain(SMTP_SERVER, "smtp.gmail.com"),
    plain(SMTP_PORT, "587"),
    secure(SMTP_USER, "user@gmail.com"),
    secure(SMTP_PASS, "password"),
];
