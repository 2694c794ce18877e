//! Model checkpointing.
//!
//! Policy and value parameters are saved as a pair, keyed by episode index:
//!
//! ```text
//! <dir>/policy_model_episode_<n>.bin
//! <dir>/value_model_episode_<n>.bin
//! ```
//!
//! A pair is restored only when both files exist, and a complete pair is
//! never overwritten.
//!
//! ## Example
//!
//! ```rust,ignore
//! let checkpointer = Checkpointer::new("model_checkpoints").with_interval(20);
//!
//! if checkpointer.should_save(episode) {
//!     checkpointer.save(episode, agent.policy(), agent.value())?;
//! }
//!
//! if let Some((policy, value)) = checkpointer.load(start_episode, &device)? {
//!     agent.set_networks(policy, value);
//! }
//! ```

pub mod checkpointer;

pub use checkpointer::{CheckpointError, Checkpointer, NetworkRole};
