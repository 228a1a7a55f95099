use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"\p{P}").expect("valid regex");
}

/// Common English words, usually blacklisted when a collection is first set up.
#[rustfmt::skip]
pub const STOPWORDS: &[&str] = &[
    "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
    "be","because","been","before","being","below","between","both","but","by",
    "can","can't","cannot","could","couldn't",
    "did","didn't","do","does","doesn't","doing","don't","down","during",
    "each","few","for","from","further",
    "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
    "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
    "let's","me","more","most","mustn't","my","myself",
    "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
    "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
    "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
    "under","until","up","very",
    "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
    "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
];

/// Case-fold a single word: NFKC normalization followed by Unicode lowercasing.
pub fn fold(word: &str) -> String {
    word.nfkc().collect::<String>().to_lowercase()
}

/// Normalize a single word into the term it is indexed under: folded, with
/// punctuation deleted and surrounding whitespace trimmed, exactly as
/// [`tokenize`] treats each word. `"Don't"` becomes `"dont"`.
pub fn term(word: &str) -> String {
    let folded = fold(word);
    PUNCTUATION.replace_all(&folded, "").trim().to_string()
}

/// Split text into indexable terms.
///
/// The text is folded, then every character of the Unicode `Punctuation`
/// category (`\p{P}`) is deleted outright, so `alt-text` becomes `alttext`.
/// What remains is split on Unicode whitespace and empty pieces are dropped.
/// Letters, digits and symbols such as `$` or `+` are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    let folded = fold(text);
    let stripped = PUNCTUATION.replace_all(&folded, "");
    stripped.split_whitespace().map(str::to_string).collect()
}

/// Tokenize a user phrase, keeping only the first occurrence of each term.
pub fn query_terms(phrase: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(phrase)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
