mod trackingcontroller;
mod dummytrackingcontroller;
mod markeranimator;
mod poller;

pub use trackingcontroller::FetchError;
pub use trackingcontroller::TrackingController;
pub use trackingcontroller::TrackingControllerPointer;
pub use trackingcontroller::TrackingControllerSharedPointer;

pub use dummytrackingcontroller::DummyTrackingController;

pub use markeranimator::MarkerAnimator;
pub use markeranimator::MarkerStyle;

pub use poller::poll_interval;
pub use poller::poll_once;
pub use poller::PollOutcome;

#[cfg(feature = "backend")]
mod httptrackingcontroller;

#[cfg(feature = "backend")]
pub use httptrackingcontroller::HttpTrackingController;
