//! One-shot notifications carried across a redirect in a signed cookie.

use axum_extra::extract::{cookie::Cookie, SignedCookieJar};

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

pub fn success(jar: SignedCookieJar, message: impl AsRef<str>) -> SignedCookieJar {
    push(jar, Level::Success, message.as_ref())
}

pub fn error(jar: SignedCookieJar, message: impl AsRef<str>) -> SignedCookieJar {
    push(jar, Level::Error, message.as_ref())
}

fn push(jar: SignedCookieJar, level: Level, message: &str) -> SignedCookieJar {
    let value = format!("{}:{}", level.as_str(), urlencoding::encode(message));
    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true),
    )
}

/// Reads the pending flash, if any, and clears it so it shows only once.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };

    let flash = parse(cookie.value());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}

fn parse(value: &str) -> Option<Flash> {
    let (level, message) = value.split_once(':')?;
    let level = match level {
        "success" => Level::Success,
        "error" => Level::Error,
        _ => return None,
    };

    Some(Flash {
        level,
        message: urlencoding::decode(message).ok()?.into_owned(),
    })
}
