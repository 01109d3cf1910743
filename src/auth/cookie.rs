use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub const SESSION_COOKIE: &str = "jwt";

/// Browsers keep the session cookie for a week regardless of token lifetime.
pub const SESSION_COOKIE_MAX_AGE: Duration = Duration::days(7);

fn base(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = base(token, secure);
    cookie.set_max_age(SESSION_COOKIE_MAX_AGE);
    cookie
}

/// An expired, empty `jwt` cookie. Added to the jar unconditionally so the
/// `Set-Cookie` goes out even when the request carried no session.
pub fn cleared_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = base(String::new(), secure);
    cookie.make_removal();
    cookie
}
