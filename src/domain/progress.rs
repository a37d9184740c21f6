use log::info;

/// Track progress of board fetching
pub struct FetchProgress {
    total: usize,
    fetched: usize,
    skipped: usize,
    failed: usize,
}

impl FetchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            fetched: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn increment_fetched(&mut self) {
        self.fetched += 1;
        self.log_progress();
    }

    pub fn increment_skipped(&mut self) {
        self.skipped += 1;
        self.log_progress();
    }

    pub fn increment_failed(&mut self) {
        self.failed += 1;
        self.log_progress();
    }

    pub fn current_count(&self) -> usize {
        self.fetched + self.skipped + self.failed
    }

    pub fn fetched(&self) -> usize {
        self.fetched
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    fn log_progress(&self) {
        let current = self.current_count();
        if should_log(current, self.total) {
            info!(
                "  → Progress: {}/{} boards ({} fetched, {} skipped, {} failed)",
                current, self.total, self.fetched, self.skipped, self.failed
            );
        }
    }
}

fn should_log(current: usize, total: usize) -> bool {
    is_milestone(current) || is_complete(current, total)
}

fn is_milestone(count: usize) -> bool {
    count % 10 == 0
}

fn is_complete(current: usize, total: usize) -> bool {
    current == total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_every_outcome() {
        let mut progress = FetchProgress::new(3);
        progress.increment_fetched();
        progress.increment_skipped();
        progress.increment_failed();

        assert_eq!(progress.current_count(), 3);
        assert_eq!(progress.fetched(), 1);
        assert_eq!(progress.skipped(), 1);
        assert_eq!(progress.failed(), 1);
    }
}
