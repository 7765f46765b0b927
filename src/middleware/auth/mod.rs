/*
 * Responsibility
 * - 認証系 middleware の公開インターフェース
 */
pub mod session_auth;
