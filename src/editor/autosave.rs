use crate::template::Template;

/// Quiet period after the last edit before a draft is saved.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;

/// Trailing-edge debouncer for editor saves.
///
/// Every queued draft replaces the pending one and restarts the wait, so a
/// burst of edits produces a single save carrying the last draft. The
/// debouncer is bound to one template identity at a time.
#[derive(Debug)]
pub struct SaveDebouncer {
    delay_ms: u64,
    bound_uuid: Option<String>,
    pending: Option<(Template, u64)>,
}

impl SaveDebouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            bound_uuid: None,
            pending: None,
        }
    }

    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Bind to a template identity. Switching to a different template drops
    /// whatever was pending for the previous one.
    pub fn rebind(&mut self, uuid: &str) {
        if self.bound_uuid.as_deref() == Some(uuid) {
            return;
        }
        if let Some((draft, _)) = self.pending.take() {
            tracing::debug!(old = %draft.uuid, new = %uuid, "autosave.rebind.drop_pending");
        }
        self.bound_uuid = Some(uuid.to_string());
    }

    /// Schedule `draft` to be saved after the quiet period.
    pub fn queue(&mut self, draft: Template, now_ms: u64) {
        if self.bound_uuid.as_deref() != Some(draft.uuid.as_str()) {
            self.rebind(&draft.uuid);
        }
        self.pending = Some((draft, now_ms));
    }

    /// Take the pending draft once the quiet period has elapsed.
    pub fn take_ready(&mut self, now_ms: u64) -> Option<Template> {
        let (_, queued_at) = self.pending.as_ref()?;
        if now_ms.saturating_sub(*queued_at) >= self.delay_ms {
            self.pending.take().map(|(draft, _)| draft)
        } else {
            None
        }
    }

    /// Take the pending draft immediately, ignoring the quiet period.
    pub fn flush(&mut self) -> Option<Template> {
        self.pending.take().map(|(draft, _)| draft)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Milliseconds until the pending draft becomes ready.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        let (_, queued_at) = self.pending.as_ref()?;
        Some(
            self.delay_ms
                .saturating_sub(now_ms.saturating_sub(*queued_at)),
        )
    }
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(uuid: &str, html: &str) -> Template {
        Template::new(uuid, "Name", "Subject", None, html)
    }

    /// Run the debouncer over a list of (time, draft) edits and poll every
    /// 10ms until `end_ms`, collecting what fires.
    fn simulate(edits: &[(u64, Template)], end_ms: u64) -> Vec<Template> {
        let mut debouncer = SaveDebouncer::default();
        let mut fired = Vec::new();
        let mut edits = edits.iter().peekable();
        let mut now = 0;
        while now <= end_ms {
            while let Some((at, d)) = edits.peek() {
                if *at > now {
                    break;
                }
                debouncer.queue(d.clone(), *at);
                edits.next();
            }
            if let Some(saved) = debouncer.take_ready(now) {
                fired.push(saved);
            }
            now += 10;
        }
        fired
    }

    #[test]
    fn test_burst_of_edits_fires_once_with_last_draft() {
        let edits: Vec<(u64, Template)> = (0..5u64)
            .map(|i| (i * 200, draft("t-1", &"x".repeat(usize::try_from(i).unwrap() + 1))))
            .collect();
        let fired = simulate(&edits, 5000);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].html_body, "xxxxx");
    }

    #[test]
    fn test_edits_separated_by_pause_fire_twice() {
        let edits = vec![(0, draft("t-1", "a")), (2500, draft("t-1", "ab"))];
        let fired = simulate(&edits, 6000);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].html_body, "a");
        assert_eq!(fired[1].html_body, "ab");
    }

    #[test]
    fn test_new_edit_restarts_the_wait() {
        let mut debouncer = SaveDebouncer::new(1000);
        debouncer.queue(draft("t-1", "a"), 0);
        debouncer.queue(draft("t-1", "ab"), 900);
        assert!(debouncer.take_ready(1000).is_none());
        assert!(debouncer.take_ready(1899).is_none());
        assert_eq!(debouncer.take_ready(1900).map(|t| t.html_body), Some("ab".into()));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_flush_returns_pending_immediately() {
        let mut debouncer = SaveDebouncer::new(1000);
        debouncer.queue(draft("t-1", "a"), 0);
        assert_eq!(debouncer.flush().map(|t| t.html_body), Some("a".into()));
        assert!(debouncer.flush().is_none());
    }

    #[test]
    fn test_rebind_to_other_template_drops_pending() {
        let mut debouncer = SaveDebouncer::new(1000);
        debouncer.queue(draft("t-1", "a"), 0);
        debouncer.rebind("t-1");
        assert!(debouncer.is_pending());
        debouncer.rebind("t-2");
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_remaining_ms_counts_down() {
        let mut debouncer = SaveDebouncer::new(1000);
        assert_eq!(debouncer.remaining_ms(0), None);
        debouncer.queue(draft("t-1", "a"), 100);
        assert_eq!(debouncer.remaining_ms(600), Some(500));
        assert_eq!(debouncer.remaining_ms(5000), Some(0));
    }
}
