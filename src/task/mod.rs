/*!
 * Task Module
 * Priority-ordered task primitive and its execution contract
 */

pub mod cancel;
pub mod priority_task;
pub mod work;

pub use cancel::CancellationToken;
pub use priority_task::{compare, PriorityTask};
pub use work::Work;
