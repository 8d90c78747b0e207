use std::collections::HashMap;
use std::hash::Hash;

/// One candidate's share of an election's votes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyEntry<K> {
    pub candidate: K,
    pub votes: u64,
}

/// Per-candidate vote counts for a single election.
///
/// Every candidate appears exactly once, in the order the candidates were
/// given, including those nobody voted for. The total is the sum over the
/// candidates, so votes referencing an unknown candidate (e.g. one that has
/// since been removed) do not contribute to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<K> {
    entries: Vec<TallyEntry<K>>,
    total: u64,
}

impl<K> Tally<K>
where
    K: Eq + Hash,
{
    /// Count `votes` (one candidate key per vote) against `candidates`.
    pub fn count<'v, C, V>(candidates: C, votes: V) -> Self
    where
        C: IntoIterator<Item = K>,
        V: IntoIterator<Item = &'v K>,
        K: 'v,
    {
        let mut counts: HashMap<&K, u64> = HashMap::new();
        for vote in votes {
            *counts.entry(vote).or_default() += 1;
        }

        let entries: Vec<_> = candidates
            .into_iter()
            .map(|candidate| {
                let votes = counts.get(&candidate).copied().unwrap_or(0);
                TallyEntry { candidate, votes }
            })
            .collect();
        let total = entries.iter().map(|entry| entry.votes).sum();

        Self { entries, total }
    }
}

impl<K> Tally<K> {
    /// Entries in candidate input order.
    pub fn entries(&self) -> &[TallyEntry<K>] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Entries sorted by vote count, most first. Candidates with equal counts
    /// keep their input order.
    pub fn ranked(self) -> Vec<TallyEntry<K>> {
        let mut entries = self.entries;
        // `sort_by` is stable.
        entries.sort_by(|a, b| b.votes.cmp(&a.votes));
        entries
    }

    pub fn into_entries(self) -> Vec<TallyEntry<K>> {
        self.entries
    }
}

/// `round(count / total * 100)`, or 0 when there are no votes at all.
pub fn percentage(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    // Integer form of floor(count * 100 / total + 0.5).
    (count * 200 + total) / (total * 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally<'a>(candidates: &[&'a str], votes: &[&'a str]) -> Tally<&'a str> {
        Tally::count(candidates.iter().copied(), votes.iter())
    }

    #[test]
    fn ranked_results_with_percentages() {
        let tally = tally(&["C", "A", "B"], &["A", "B", "A", "A"]);
        assert_eq!(tally.total(), 4);

        let percentages: Vec<_> = tally
            .clone()
            .ranked()
            .into_iter()
            .map(|entry| (entry.candidate, entry.votes, percentage(entry.votes, tally.total())))
            .collect();
        assert_eq!(percentages, vec![("A", 3, 75), ("B", 1, 25), ("C", 0, 0)]);
    }

    #[test]
    fn candidates_without_votes_are_present() {
        let tally = tally(&["A", "B", "C"], &[]);
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.entries().len(), 3);
        assert!(tally.entries().iter().all(|entry| entry.votes == 0));
        assert!(tally
            .entries()
            .iter()
            .all(|entry| percentage(entry.votes, tally.total()) == 0));
    }

    #[test]
    fn counts_sum_to_total() {
        let votes = ["B", "B", "A", "C", "B", "A", "D", "C", "B"];
        let tally = tally(&["A", "B", "C", "D"], &votes);
        let sum: u64 = tally.entries().iter().map(|entry| entry.votes).sum();
        assert_eq!(sum, tally.total());
        assert_eq!(tally.total(), votes.len() as u64);
    }

    #[test]
    fn votes_for_unknown_candidates_are_ignored() {
        let tally = tally(&["A", "B"], &["A", "gone", "B", "gone"]);
        assert_eq!(tally.total(), 2);
        let sum: u64 = tally.entries().iter().map(|entry| entry.votes).sum();
        assert_eq!(sum, tally.total());
    }

    #[test]
    fn ties_keep_input_order() {
        let tally = tally(&["X", "Y", "Z", "W"], &["Z", "Y", "W", "W"]);
        let order: Vec<_> = tally.ranked().into_iter().map(|e| e.candidate).collect();
        assert_eq!(order, vec!["W", "Y", "Z", "X"]);
    }

    #[test]
    fn percentage_rounds_half_up_and_guards_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 200), 1); // 0.5
        assert_eq!(percentage(7, 7), 100);
    }
}
