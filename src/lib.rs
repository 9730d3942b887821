pub mod aggregator;
pub mod config;
pub mod coords;
pub mod error;
pub mod joint;
pub mod message;
pub mod point;
pub mod receiver;
pub mod sender;
pub mod skeleton;

pub use aggregator::SkeletonAggregator;
pub use coords::{CoordinateMode, CoordinateTransform};
pub use error::{Result, SkeletonError};
pub use joint::Joint;
pub use message::SkeletonMessage;
pub use point::Point;
pub use receiver::{OscReceiver, SkeletonServer, ThreadedReceiver};
pub use skeleton::{Orientation, Skeleton};
