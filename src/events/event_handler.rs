/// A projection that folds a stream of events into local state.
pub trait EventHandler<T> {
    fn handle_event(&mut self, event: &T);
}
