/// Source of decoded IR frames.
///
/// Once a frame has been captured, [`try_decode`](Receiver::try_decode) keeps
/// returning it and further transmissions are ignored until
/// [`resume`](Receiver::resume) re-arms capture.
pub trait Receiver {
    /// Returns the pending frame's code, if any. Never blocks.
    fn try_decode(&mut self) -> Option<u32>;

    fn resume(&mut self);
}
