/*!
 * Session extractor
 *
 * Responsibility:
 * - session layer が request extensions に入れた session を RequestSessions として handler に渡す
 */

mod core;

pub use core::Sessions;
