/// Handle returned by `Observers::subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(usize);

// Registered callbacks, notified in subscription order.
pub struct Observers<T: ?Sized> {
    next_id: usize,
    callbacks: Vec<(usize, Box<dyn Fn(&T) + Send + Sync>)>,
}

impl<T: ?Sized> Default for Observers<T> {
    fn default() -> Self {
        Self { next_id: 0, callbacks: Vec::new() }
    }
}

impl<T: ?Sized> Observers<T> {
    pub fn subscribe<F>(&mut self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        Subscription(id)
    }

    // Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(id, _)| *id != subscription.0);
        self.callbacks.len() != before
    }

    pub fn notify(&self, value: &T) {
        for (_, callback) in &self.callbacks {
            callback(value);
        }
    }
}
