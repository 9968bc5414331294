//! Page-number window for paginated listings.

use std::ops::RangeInclusive;

pub const MAX_PAGE_BUTTONS: u32 = 5;

/// Page numbers to show as buttons, centred on `current` where possible.
///
/// `None` when there is nothing to paginate (`total <= 1`).
pub fn page_window(current: u32, total: u32) -> Option<RangeInclusive<u32>> {
    if total <= 1 {
        return None;
    }
    if total <= MAX_PAGE_BUTTONS {
        return Some(1..=total);
    }

    let before = MAX_PAGE_BUTTONS / 2;
    let after = (MAX_PAGE_BUTTONS + 1) / 2 - 1;

    let window = if current <= before {
        1..=MAX_PAGE_BUTTONS
    } else if current + after >= total {
        (total - MAX_PAGE_BUTTONS + 1)..=total
    } else {
        (current - before)..=(current + after)
    };
    Some(window)
}

/// Accept a page change only when it targets a different, existing page.
pub fn accept_page_change(target: u32, current: u32, total: u32) -> Option<u32> {
    if target < 1 || target > total || target == current {
        None
    } else {
        Some(target)
    }
}

/// Pull the current page back when the server reports fewer pages than
/// expected (e.g. after a filter change). Zero reported pages leaves it alone.
pub fn clamp_to_reported(current: u32, reported_pages: u32) -> u32 {
    if reported_pages > 0 && current > reported_pages {
        reported_pages
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_totals_show_every_page() {
        assert_eq!(page_window(1, 0), None);
        assert_eq!(page_window(1, 1), None);
        assert_eq!(page_window(2, 4), Some(1..=4));
        assert_eq!(page_window(5, 5), Some(1..=5));
    }

    #[test]
    fn window_slides_with_current_page() {
        assert_eq!(page_window(1, 20), Some(1..=5));
        assert_eq!(page_window(2, 20), Some(1..=5));
        assert_eq!(page_window(3, 20), Some(1..=5));
        assert_eq!(page_window(10, 20), Some(8..=12));
        assert_eq!(page_window(18, 20), Some(16..=20));
        assert_eq!(page_window(20, 20), Some(16..=20));
    }

    #[test]
    fn page_change_guard() {
        assert_eq!(accept_page_change(0, 1, 5), None);
        assert_eq!(accept_page_change(6, 1, 5), None);
        assert_eq!(accept_page_change(3, 3, 5), None);
        assert_eq!(accept_page_change(4, 3, 5), Some(4));
    }

    #[test]
    fn clamp_follows_server_page_count() {
        assert_eq!(clamp_to_reported(7, 3), 3);
        assert_eq!(clamp_to_reported(2, 3), 2);
        assert_eq!(clamp_to_reported(7, 0), 7);
    }
}
