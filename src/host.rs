use rustc_hash::{FxHashMap, FxHashSet};

/// Events a mounted particle system can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    Resize,
    PointerMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

/// Listener registry and frame scheduler for the hosting window.
///
/// The window's event loop only forwards an event to the particle system
/// while a listener for it is registered, and only runs a frame while a
/// frame request is pending. Everything a mount registers here must be
/// removed again on unmount.
#[derive(Debug, Default)]
pub struct EventHub {
    next_id: u64,
    listeners: FxHashMap<ListenerId, HostEvent>,
    pending_frames: FxHashSet<FrameRequest>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_listener(&mut self, event: HostEvent) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listeners.insert(id, event);
        log::trace!("Added {:?} listener {:?}", event, id);
        id
    }

    /// Returns false if the listener was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(&id).is_some();
        if removed {
            log::trace!("Removed listener {:?}", id);
        }
        removed
    }

    pub fn has_listener(&self, event: HostEvent) -> bool {
        self.listeners.values().any(|&e| e == event)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Asks for a callback on the next display refresh.
    pub fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id());
        self.pending_frames.insert(request);
        request
    }

    /// Returns false if the request already fired or was cancelled.
    pub fn cancel_frame(&mut self, request: FrameRequest) -> bool {
        self.pending_frames.remove(&request)
    }

    pub fn has_pending_frame(&self) -> bool {
        !self.pending_frames.is_empty()
    }

    pub fn pending_frame_count(&self) -> usize {
        self.pending_frames.len()
    }

    /// Called once per refresh. Hands out every request pending at that
    /// moment; requests made while handling them wait for the next refresh.
    pub fn take_due_frames(&mut self) -> Vec<FrameRequest> {
        let mut due: Vec<_> = self.pending_frames.drain().collect();
        due.sort_by_key(|request| request.0);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listeners() {
        let mut hub = EventHub::new();
        let resize = hub.add_listener(HostEvent::Resize);
        let pointer = hub.add_listener(HostEvent::PointerMove);
        assert_ne!(resize, pointer);
        assert_eq!(hub.listener_count(), 2);
        assert!(hub.has_listener(HostEvent::PointerMove));

        assert!(hub.remove_listener(pointer));
        assert!(!hub.remove_listener(pointer));
        assert!(!hub.has_listener(HostEvent::PointerMove));
        assert!(hub.has_listener(HostEvent::Resize));
    }

    #[test]
    fn test_frame_requests() {
        let mut hub = EventHub::new();
        let first = hub.request_frame();
        let second = hub.request_frame();
        assert_eq!(hub.pending_frame_count(), 2);

        assert!(hub.cancel_frame(second));
        assert!(!hub.cancel_frame(second));

        assert_eq!(hub.take_due_frames(), vec![first]);
        assert!(!hub.has_pending_frame());
        // a fired request can no longer be cancelled
        assert!(!hub.cancel_frame(first));
    }

    #[test]
    fn test_requests_made_during_a_frame_wait() {
        let mut hub = EventHub::new();
        hub.request_frame();
        let due = hub.take_due_frames();
        assert_eq!(due.len(), 1);

        let next = hub.request_frame();
        assert!(hub.has_pending_frame());
        assert_eq!(hub.take_due_frames(), vec![next]);
    }
}
