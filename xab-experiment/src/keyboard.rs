use xab_timing::ms_between;

use crate::host::{InputListener, KeyPress, KeyResponse, KeyboardRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

#[derive(Debug)]
struct Listener {
    handle: ListenerHandle,
    request: KeyboardRequest,
}

/// In-process keyboard listener table. The host feeds raw presses to
/// [`KeyboardRegistry::dispatch`]; the first live listener that accepts the
/// key gets it.
#[derive(Debug, Default)]
pub struct KeyboardRegistry {
    next_id: u64,
    listeners: Vec<Listener>,
}

impl KeyboardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, press: KeyPress) -> Option<KeyResponse> {
        let idx = self.listeners.iter().position(|l| {
            let r = &l.request;
            r.valid_keys.contains(&press.key)
                && (r.allow_held_key || !press.repeat)
                && press.at >= r.timing_origin
        });

        let Some(idx) = idx else {
            tracing::trace!(key = %press.key, repeat = press.repeat, "key press not accepted by any listener");
            return None;
        };

        let request = &self.listeners[idx].request;
        let response = KeyResponse {
            trial: request.trial,
            key: press.key,
            rt_ms: ms_between(request.timing_origin, press.at),
        };
        if !request.persist {
            self.listeners.remove(idx);
        }
        Some(response)
    }

    pub fn cancel_all(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl InputListener for KeyboardRegistry {
    type Handle = ListenerHandle;

    fn register(&mut self, request: KeyboardRequest) -> ListenerHandle {
        let handle = ListenerHandle(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener { handle, request });
        handle
    }

    fn cancel(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.handle != handle);
        before != self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xab_core::KeyCode;

    const MS: u64 = 1_000_000;

    fn request(persist: bool, allow_held_key: bool) -> KeyboardRequest {
        KeyboardRequest {
            trial: 3,
            valid_keys: vec![KeyCode::Q, KeyCode::P],
            timing_origin: 700 * MS,
            persist,
            allow_held_key,
        }
    }

    #[test]
    fn reaction_time_is_measured_from_origin() {
        let mut kb = KeyboardRegistry::new();
        kb.register(request(false, false));
        let r = kb.dispatch(KeyPress::new(KeyCode::Q, 850 * MS)).unwrap();
        assert_eq!(r, KeyResponse { trial: 3, key: KeyCode::Q, rt_ms: 150 });
        assert!(kb.is_empty());
    }

    #[test]
    fn only_valid_keys_match() {
        let mut kb = KeyboardRegistry::new();
        kb.register(request(false, false));
        assert!(kb.dispatch(KeyPress::new(KeyCode(65), 800 * MS)).is_none());
        assert_eq!(kb.len(), 1);
        assert!(kb.dispatch(KeyPress::new(KeyCode::P, 800 * MS)).is_some());
    }

    #[test]
    fn held_keys_are_ignored_unless_allowed() {
        let mut kb = KeyboardRegistry::new();
        kb.register(request(false, false));
        let held = KeyPress { key: KeyCode::Q, at: 800 * MS, repeat: true };
        assert!(kb.dispatch(held).is_none());

        kb.cancel_all();
        kb.register(request(false, true));
        assert!(kb.dispatch(held).is_some());
    }

    #[test]
    fn persistent_listener_keeps_matching() {
        let mut kb = KeyboardRegistry::new();
        kb.register(request(true, false));
        assert!(kb.dispatch(KeyPress::new(KeyCode::Q, 800 * MS)).is_some());
        assert!(kb.dispatch(KeyPress::new(KeyCode::P, 900 * MS)).is_some());
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn presses_before_origin_do_not_count() {
        let mut kb = KeyboardRegistry::new();
        kb.register(request(false, false));
        assert!(kb.dispatch(KeyPress::new(KeyCode::Q, 600 * MS)).is_none());
    }

    #[test]
    fn cancel_reports_whether_listener_existed() {
        let mut kb = KeyboardRegistry::new();
        let h = kb.register(request(false, false));
        assert!(kb.cancel(h));
        assert!(!kb.cancel(h));
        assert!(kb.dispatch(KeyPress::new(KeyCode::Q, 800 * MS)).is_none());
    }
}
