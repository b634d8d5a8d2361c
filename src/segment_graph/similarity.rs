use std::collections::HashSet;

/// Lower-cased whitespace tokens of `text`, duplicates collapsed.
pub fn token_set(text: &str) -> HashSet<String> {
	text.split_whitespace().map(str::to_lowercase).collect()
}

/// Jaccard similarity of two token sets, in `[0, 1]`.
///
/// Two empty sets have nothing in common and score 0.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
	let union = a.union(b).count();
	if union == 0 {
		return 0.0;
	}
	a.intersection(b).count() as f64 / union as f64
}

/// Jaccard similarity of the token sets of `a` and `b`.
pub fn text_similarity(a: &str, b: &str) -> f64 {
	jaccard(&token_set(a), &token_set(b))
}

/// Similarity of each adjacent pair: entry `i` compares items `i` and `i + 1`.
pub fn adjacent_similarities<'a, I>(texts: I) -> Vec<f64>
where
	I: IntoIterator<Item = &'a str>,
{
	let sets: Vec<_> = texts.into_iter().map(token_set).collect();
	sets.windows(2).map(|pair| jaccard(&pair[0], &pair[1])).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn disjoint_texts_score_zero() {
		assert_eq!(text_similarity("intro to loops", "totally different topic here"), 0.0);
	}

	#[test]
	fn case_and_duplicates_are_ignored() {
		assert_eq!(text_similarity("Loop loop LOOP", "loop"), 1.0);
	}

	#[test]
	fn partial_overlap() {
		// {intro, to, loops} vs {intro, to, loops, wrap, up}
		assert_eq!(text_similarity("intro to loops", "intro to loops wrap up"), 0.6);
	}

	#[test]
	fn empty_texts_score_zero() {
		assert_eq!(text_similarity("", "   "), 0.0);
	}

	#[test]
	fn adjacent_pairs() {
		let sims = adjacent_similarities(["a b", "a b", "c"]);
		assert_eq!(sims, vec![1.0, 0.0]);
	}
}
