use crate::errors::DomainError;

/// Maximum number of options a single select menu may carry.
pub const MAX_SELECT_OPTIONS: usize = 25;

/// Splits `items` into contiguous pages of at most `page_size`, preserving order.
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Result<Vec<Vec<T>>, DomainError> {
    if page_size == 0 {
        return Err(DomainError::InvalidPageSize);
    }

    Ok(items.chunks(page_size).map(<[T]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::{paginate, MAX_SELECT_OPTIONS};
    use crate::errors::DomainError;

    fn labels(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("employee-{index:02}")).collect()
    }

    #[test]
    fn fifty_items_make_two_full_pages_in_order() {
        let items = labels(50);
        let pages = paginate(&items, MAX_SELECT_OPTIONS).expect("paginate");

        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|page| page.len() == 25));
        assert_eq!(pages[0][0], "employee-00");
        assert_eq!(pages[1][0], "employee-25");
        assert_eq!(pages[1][24], "employee-49");
    }

    #[test]
    fn small_subset_fits_a_single_page() {
        let pages = paginate(&labels(9), MAX_SELECT_OPTIONS).expect("paginate");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].len(), 9);
    }

    #[test]
    fn empty_input_yields_no_pages() {
        let pages = paginate::<String>(&[], MAX_SELECT_OPTIONS).expect("paginate");
        assert!(pages.is_empty());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(paginate(&labels(3), 0), Err(DomainError::InvalidPageSize));
    }

    #[test]
    fn page_counts_and_concatenation_hold_across_sizes() {
        for count in [0_usize, 1, 7, 24, 25, 26, 49, 51, 53, 100] {
            for page_size in [1_usize, 3, 10, 25] {
                let items = labels(count);
                let pages = paginate(&items, page_size).expect("paginate");

                assert_eq!(pages.len(), count.div_ceil(page_size));
                assert!(pages.iter().all(|page| !page.is_empty() && page.len() <= page_size));

                let rejoined: Vec<String> = pages.into_iter().flatten().collect();
                assert_eq!(rejoined, items, "count={count} page_size={page_size}");
            }
        }
    }
}
