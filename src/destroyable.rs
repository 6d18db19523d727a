/// Implemented by owners of event subscriptions that hold `Rc` cycles back to
/// themselves; `destroy` drops the subscriptions so the cycle can be freed.
pub trait Destroyable {
    fn destroy(&mut self);
}
