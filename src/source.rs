//! Frame notification boundary between a capture subsystem and its consumers.

use core::fmt;

use crate::image::SourceImage;

/// Identifies one registered frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Passed to subscribers when a new frame is available.
///
/// The latest image can be taken at most once per notification; later
/// subscribers see `None`.
pub struct FrameReceived<'a, I> {
    latest: &'a mut Option<I>,
}

impl<'a, I: SourceImage> FrameReceived<'a, I> {
    pub fn new(latest: &'a mut Option<I>) -> Self {
        FrameReceived { latest }
    }

    /// Take ownership of the latest image. The caller becomes responsible
    /// for releasing it.
    pub fn try_acquire_latest_image(&mut self) -> Option<I> {
        self.latest.take()
    }

    pub fn has_image(&self) -> bool {
        self.latest.is_some()
    }
}

/// Callback-based frame notification.
///
/// Register on activation, deregister on deactivation.
pub trait FrameSource {
    type Image: SourceImage;
    type Error: core::error::Error;

    fn subscribe<F>(&mut self, callback: F) -> Result<SubscriptionId, Self::Error>
    where
        F: FnMut(&mut FrameReceived<'_, Self::Image>) + Send + 'static;

    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), Self::Error>;
}

#[cfg(feature = "alloc")]
pub use dispatcher::FrameDispatcher;

#[cfg(feature = "alloc")]
mod dispatcher {
    use alloc::boxed::Box;
    use alloc::vec::Vec;

    use super::{FrameReceived, FrameSource, SubscriptionId};
    use crate::error::Error;
    use crate::image::SourceImage;

    type FrameCallback<I> = Box<dyn FnMut(&mut FrameReceived<'_, I>) + Send + 'static>;

    /// A [`FrameSource`] fed by an external producer through
    /// [`publish`](FrameDispatcher::publish).
    ///
    /// Subscribers run synchronously on the publishing thread, in the order
    /// they subscribed.
    pub struct FrameDispatcher<I> {
        next_id: u64,
        subscribers: Vec<(SubscriptionId, FrameCallback<I>)>,
    }

    impl<I: SourceImage> FrameDispatcher<I> {
        pub fn new() -> Self {
            FrameDispatcher {
                next_id: 0,
                subscribers: Vec::new(),
            }
        }

        pub fn subscriber_count(&self) -> usize {
            self.subscribers.len()
        }

        /// Notify every subscriber that `image` is available.
        ///
        /// Returns `true` if a subscriber acquired the image. Otherwise the
        /// image is released here.
        pub fn publish(&mut self, image: I) -> bool {
            let mut latest = Some(image);
            for (_, callback) in &mut self.subscribers {
                callback(&mut FrameReceived::new(&mut latest));
            }
            match latest {
                Some(mut unclaimed) => {
                    tracing::debug!(
                        format = %unclaimed.pixel_format(),
                        subscribers = self.subscribers.len(),
                        "releasing unacquired image"
                    );
                    unclaimed.release();
                    false
                }
                None => true,
            }
        }
    }

    impl<I: SourceImage> Default for FrameDispatcher<I> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<I: SourceImage> FrameSource for FrameDispatcher<I> {
        type Image = I;
        type Error = Error;

        fn subscribe<F>(&mut self, callback: F) -> Result<SubscriptionId, Error>
        where
            F: FnMut(&mut FrameReceived<'_, I>) + Send + 'static,
        {
            let id = SubscriptionId(self.next_id);
            self.next_id += 1;
            self.subscribers.push((id, Box::new(callback)));
            tracing::debug!(%id, "frame subscriber added");
            Ok(id)
        }

        fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), Error> {
            let before = self.subscribers.len();
            self.subscribers.retain(|(existing, _)| *existing != id);
            if self.subscribers.len() == before {
                return Err(Error::UnknownSubscription(id));
            }
            tracing::debug!(%id, "frame subscriber removed");
            Ok(())
        }
    }

}
