/*!
 * Resource identity extractor
 *
 * Responsibility:
 * - 現在の request が「どの resource として」実行されているかを handler に提供する
 * - session auth filter が bind していなければ default resource になる
 *
 * Public API:
 * - CurrentResource
 * - ResourceCtx (re-export)
 */

mod core;

pub use crate::services::auth::ResourceCtx;
pub use core::CurrentResource;
