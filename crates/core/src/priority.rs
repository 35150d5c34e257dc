//! Study order for a deck.
//!
//! Due cards come first, hardest first. Cards that are not due yet follow,
//! never-reviewed ones before reviewed ones, each group soonest-due first.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::model::Card;

/// Compares two cards for study priority at a fixed `now`.
///
/// `now` must be the same instant for every comparison of one sort, otherwise
/// the order is not guaranteed to be transitive.
#[must_use]
pub fn compare_priority(a: &Card, b: &Card, now: DateTime<Utc>) -> Ordering {
    match (a.is_due(now), b.is_due(now)) {
        (true, true) => b.difficulty().cmp(&a.difficulty()),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => b
            .is_new()
            .cmp(&a.is_new())
            .then_with(|| a.next_review_at().cmp(&b.next_review_at())),
    }
}

/// Sorts `cards` in place into study order.
///
/// The sort is stable: cards that compare equal keep their relative order, so
/// sorting an already sorted slice at the same `now` changes nothing.
pub fn sort_by_priority(cards: &mut [Card], now: DateTime<Utc>) {
    cards.sort_by(|a, b| compare_priority(a, b, now));
}

/// Owned variant of [`sort_by_priority`].
#[must_use]
pub fn prioritized(cards: impl IntoIterator<Item = Card>, now: DateTime<Utc>) -> Vec<Card> {
    let mut cards: Vec<Card> = cards.into_iter().collect();
    sort_by_priority(&mut cards, now);
    cards
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardId, DeckId, Difficulty};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn card(id: u64, difficulty: Difficulty, review_count: u32, due_in_days: i64) -> Card {
        let now = fixed_now();
        Card::from_persisted(
            CardId::new(id),
            DeckId::new(1),
            format!("Q{id}"),
            format!("A{id}"),
            difficulty,
            review_count,
            now + Duration::days(due_in_days),
            now - Duration::days(30),
            now - Duration::days(30),
        )
    }

    fn ids(cards: &[Card]) -> Vec<u64> {
        cards.iter().map(|c| c.id().value()).collect()
    }

    fn mixed_deck() -> Vec<Card> {
        vec![
            card(1, Difficulty::EASY, 4, 6),
            card(2, Difficulty::NEW, 0, 2),
            card(3, Difficulty::EASY, 2, -1),
            card(4, Difficulty::MEDIUM, 3, 1),
            card(5, Difficulty::HARD, 5, -3),
            card(6, Difficulty::NEW, 0, 0),
            card(7, Difficulty::from_level(9), 1, -2),
            card(8, Difficulty::MEDIUM, 2, 0),
            card(9, Difficulty::NEW, 0, 1),
            card(10, Difficulty::from_level(-1), 3, 4),
        ]
    }

    #[test]
    fn deck_with_due_and_future_cards() {
        let now = fixed_now();
        let deck = vec![
            card(4, Difficulty::MEDIUM, 2, 5),
            card(3, Difficulty::NEW, 0, 1),
            card(2, Difficulty::EASY, 1, -1),
            card(1, Difficulty::HARD, 1, -1),
        ];
        assert_eq!(ids(&prioritized(deck, now)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn future_cards_sort_by_soonest_review() {
        let now = fixed_now();
        let deck = vec![
            card(1, Difficulty::MEDIUM, 2, 10),
            card(2, Difficulty::MEDIUM, 2, 3),
        ];
        assert_eq!(ids(&prioritized(deck, now)), vec![2, 1]);
    }

    #[test]
    fn due_cards_precede_future_cards() {
        let now = fixed_now();
        let sorted = prioritized(mixed_deck(), now);
        let first_future = sorted
            .iter()
            .position(|c| !c.is_due(now))
            .unwrap_or(sorted.len());
        assert!(sorted[..first_future].iter().all(|c| c.is_due(now)));
        assert!(sorted[first_future..].iter().all(|c| !c.is_due(now)));
    }

    #[test]
    fn due_cards_are_hardest_first() {
        let now = fixed_now();
        let sorted = prioritized(mixed_deck(), now);
        let due: Vec<Difficulty> = sorted
            .iter()
            .filter(|c| c.is_due(now))
            .map(Card::difficulty)
            .collect();
        assert!(due.windows(2).all(|w| w[0] >= w[1]));
        // out-of-range level 9 compares numerically, ahead of Hard
        assert_eq!(due.first(), Some(&Difficulty::from_level(9)));
    }

    #[test]
    fn new_future_cards_precede_reviewed_future_cards() {
        let now = fixed_now();
        let sorted = prioritized(mixed_deck(), now);
        let future: Vec<&Card> = sorted.iter().filter(|c| !c.is_due(now)).collect();
        let first_reviewed = future
            .iter()
            .position(|c| !c.is_new())
            .unwrap_or(future.len());
        assert!(future[..first_reviewed].iter().all(|c| c.is_new()));
        assert!(future[first_reviewed..].iter().all(|c| !c.is_new()));
        assert!(
            future[first_reviewed..]
                .windows(2)
                .all(|w| w[0].next_review_at() <= w[1].next_review_at())
        );
    }

    #[test]
    fn card_due_exactly_now_counts_as_due() {
        let now = fixed_now();
        let deck = vec![
            card(1, Difficulty::NEW, 0, 1),
            card(2, Difficulty::EASY, 3, 0),
        ];
        assert_eq!(ids(&prioritized(deck, now)), vec![2, 1]);
    }

    #[test]
    fn sorting_twice_is_stable() {
        let now = fixed_now();
        let once = prioritized(mixed_deck(), now);
        let mut twice = once.clone();
        sort_by_priority(&mut twice, now);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn ties_keep_input_order() {
        let now = fixed_now();
        let deck = vec![
            card(3, Difficulty::HARD, 2, -1),
            card(1, Difficulty::HARD, 7, -5),
            card(2, Difficulty::HARD, 1, -2),
        ];
        assert_eq!(ids(&prioritized(deck, now)), vec![3, 1, 2]);
    }

    #[test]
    fn comparator_is_consistent_on_all_pairs() {
        let now = fixed_now();
        let deck = mixed_deck();
        for a in &deck {
            assert_eq!(compare_priority(a, a, now), Ordering::Equal);
            for b in &deck {
                assert_eq!(
                    compare_priority(a, b, now),
                    compare_priority(b, a, now).reverse()
                );
                for c in &deck {
                    if compare_priority(a, b, now) != Ordering::Greater
                        && compare_priority(b, c, now) != Ordering::Greater
                    {
                        assert_ne!(compare_priority(a, c, now), Ordering::Greater);
                    }
                }
            }
        }
    }

    #[test]
    fn empty_deck_sorts_to_empty() {
        assert!(prioritized(Vec::new(), fixed_now()).is_empty());
    }
}
