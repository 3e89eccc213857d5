//! Model backends: traits for the external models plus the remote and random
//! implementations.

mod backend;
pub mod random;
mod remote;

pub use backend::{
    ArcScorer, ArcScores, BackendError, LabelScore, SequenceLabeler, TagScorer, TagScores,
};
pub use random::RandomBoundaryLabeler;
pub use remote::RemoteModel;
