/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http (request id / trace / timeout), security headers, session cookie, session auth filter
 */
pub mod auth;
pub mod http;
pub mod security_headers;
pub mod session;
