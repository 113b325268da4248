/// Property-based tests using proptest
/// Tests invariants of ranking and score-to-label mapping for all inputs
use proptest::prelude::*;
use rust_match_predictor::models::PredictionResult;
use rust_match_predictor::ranking::{map_score_to_label, normalize_index, rank};
use rust_match_predictor::validation::filter_candidates;

// Property: label mapping always lands inside the list
proptest! {
    #[test]
    fn normalized_index_in_range(score in any::<i64>(), len in 1usize..64) {
        let index = normalize_index(score, len).unwrap();
        prop_assert!(index < len);
    }

    #[test]
    fn mapping_matches_modulo_definition(
        score in -10_000i64..10_000,
        labels in prop::collection::vec("[a-z]{1,8}", 1..12)
    ) {
        let n = labels.len() as i64;
        let expected = (((score % n) + n) % n) as usize;
        let label = map_score_to_label(score, labels.as_slice()).unwrap();
        prop_assert_eq!(label, labels[expected].as_str());
    }

    #[test]
    fn empty_labels_always_invalid(score in any::<i64>()) {
        let labels: Vec<String> = Vec::new();
        let err = map_score_to_label(score, labels.as_slice()).unwrap_err();
        prop_assert!(err.is_invalid_configuration());
    }
}

// Property: ranking is a stable descending sort
proptest! {
    #[test]
    fn rank_is_sorted_and_stable(scores in prop::collection::vec(-5i64..5, 0..40)) {
        // Encode the input position in the name so ties can be checked
        let input: Vec<PredictionResult> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| PredictionResult::new("me", i.to_string(), *s))
            .collect();

        let ranked = rank(input.clone());
        prop_assert_eq!(ranked.len(), input.len());

        for pair in ranked.as_slice().windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                let a: usize = pair[0].secondary_name.parse().unwrap();
                let b: usize = pair[1].secondary_name.parse().unwrap();
                prop_assert!(a < b, "tie reordered: {} before {}", a, b);
            }
        }
    }

    #[test]
    fn rank_best_has_max_score(scores in prop::collection::vec(any::<i64>(), 1..20)) {
        let input: Vec<PredictionResult> = scores
            .iter()
            .map(|s| PredictionResult::new("me", "x", *s))
            .collect();

        let best = rank(input).best().map(|r| r.score);
        prop_assert_eq!(best, scores.iter().copied().max());
    }
}

// Property: candidate filtering never keeps blanks and never reorders
proptest! {
    #[test]
    fn filtered_candidates_are_non_blank(candidates in prop::collection::vec("[ a-c]{0,4}", 0..20)) {
        let filtered = filter_candidates(candidates.as_slice());
        prop_assert!(filtered.iter().all(|c| !c.trim().is_empty()));

        let expected: Vec<String> = candidates
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        prop_assert_eq!(filtered, expected);
    }
}
