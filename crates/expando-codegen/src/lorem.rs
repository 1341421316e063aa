//! Pseudo-text generator for `lorem` / `lipsum` elements.
//!
//! `lorem10` gives ten words, `lorem5-12` between five and twelve,
//! `loremru` switches the word bank.

use std::sync::LazyLock;

use expando_parser::{AbbreviationNode, Value};
use rand::Rng;
use regex::Regex;

use crate::config::Config;
use crate::transform::{resolve_implicit_tag, Ancestor};

static LOREM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:lorem|lipsum)([a-z]*)(\d*)(-\d*)?$").expect("valid lorem regex")
});

const DEFAULT_WORD_COUNT: usize = 30;

struct Vocabulary {
    common: &'static [&'static str],
    words: &'static [&'static str],
}

const LATIN: Vocabulary = Vocabulary {
    common: &["lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipisicing", "elit"],
    words: &[
        "exercitationem", "perferendis", "perspiciatis", "laborum", "eveniet", "sunt", "iure",
        "nam", "nobis", "eum", "cum", "officiis", "excepturi", "odio", "consectetur", "quasi",
        "aut", "quisquam", "vel", "eligendi", "itaque", "non", "odit", "tempore", "quaerat",
        "dignissimos", "facilis", "neque", "nihil", "expedita", "vitae", "vero", "ipsum",
        "nisi", "animi", "cumque", "pariatur", "velit", "modi", "natus", "iusto", "eaque",
        "sequi", "illo", "sed", "ex", "et", "voluptatibus", "tempora", "veritatis", "ratione",
        "assumenda", "incidunt", "nostrum", "placeat", "aliquid", "fuga", "provident",
        "praesentium", "rem", "necessitatibus", "suscipit", "adipisci", "quidem", "possimus",
        "voluptas", "debitis", "sint", "accusantium", "unde", "sapiente", "voluptate", "qui",
        "aspernatur", "laudantium", "soluta", "amet", "quo", "aliquam", "saepe", "culpa",
        "libero", "ipsa", "dicta", "reiciendis", "nesciunt", "doloribus", "autem", "impedit",
        "minima", "maiores", "repudiandae", "ipsam", "obcaecati", "ullam", "enim", "totam",
        "delectus", "ducimus", "quis", "voluptates", "dolores", "molestiae", "harum",
        "dolorem", "quia", "voluptatem", "molestias", "magni", "distinctio", "omnis", "illum",
        "dolorum", "voluptatum", "ea", "quas", "quam", "corporis", "quae", "blanditiis",
        "atque", "deserunt", "laboriosam", "earum", "consequuntur", "hic", "cupiditate",
        "quibusdam", "accusamus", "ut", "rerum", "error", "minus", "eius", "ab", "ad", "nemo",
        "fugit", "officia", "at", "in", "id", "quos", "reprehenderit", "numquam", "iste",
        "fugiat", "sit", "inventore", "beatae", "repellendus", "magnam", "recusandae", "quod",
        "explicabo", "doloremque", "aperiam", "consequatur", "asperiores", "commodi",
        "optio", "dolor", "labore", "temporibus", "repellat", "veniam", "architecto", "est",
        "esse", "mollitia", "nulla", "a", "similique", "eos", "alias", "dolore", "tenetur",
        "deleniti", "porro", "facere", "maxime", "corrupti",
    ],
};

const RU: Vocabulary = Vocabulary {
    common: &[
        "далеко-далеко", "за", "словесными", "горами", "в стране", "гласных", "и",
        "согласных", "живут", "рыбные", "тексты",
    ],
    words: &[
        "вдали", "от", "всех", "они", "буквенных", "домах", "на", "берегу", "семантика",
        "большого", "языкового", "океана", "маленький", "ручеек", "даль", "журчит", "по",
        "всей", "обеспечивает", "ее", "всеми", "необходимыми", "правилами", "эта",
        "парадигматическая", "страна", "которой", "жаренные", "предложения", "залетают",
        "прямо", "рот", "даже", "всемогущая", "пунктуация", "не", "имеет", "власти", "над",
        "рыбными", "текстами", "ведущими", "безорфографичный", "образ", "жизни", "однажды",
        "одна", "маленькая", "строчка", "рыбного", "текста", "имени", "lorem", "ipsum",
        "решила", "выйти", "большой", "мир", "грамматики", "великий", "оксмокс",
        "предупреждал", "о", "злых", "запятых", "диких", "знаках", "вопроса", "коварных",
        "точках", "с", "запятой", "но", "текст", "дал", "сбить", "себя", "толку", "он",
        "собрал", "семь", "своих", "заглавных", "букв", "подпоясал", "инициал", "за", "пояс",
        "пустился", "дорогу", "взобравшись", "первую", "вершину", "курсивных", "гор",
        "бросил", "последний", "взгляд", "назад", "силуэт", "своего", "родного", "города",
    ],
};

const SP: Vocabulary = Vocabulary {
    common: &[
        "mujer", "uno", "dolor", "más", "de", "poder", "mismo", "si",
    ],
    words: &[
        "ejercicio", "preferencia", "perspicacia", "laboral", "paño", "suntuoso", "molde",
        "namibia", "planeador", "mirar", "demás", "oficinista", "excepción", "odio",
        "consecuencia", "casi", "auto", "chicharra", "velo", "elixir", "ataque", "no",
        "odio", "temporal", "cuórum", "dignísimo", "facilismo", "letra", "nihilista",
        "expedición", "alma", "alveolar", "aparte", "león", "animal", "como", "paria",
        "belleza", "modo", "natividad", "justo", "ataque", "séquito", "pillo", "sed", "ex",
        "y", "voluminoso", "temporalidad", "verdades", "racional", "asunción", "incidente",
        "marejada", "placenta", "amanecer", "fuga", "previsor", "presentación", "lejos",
        "necesariamente", "sospechoso", "adiposidad", "quindío", "pócima", "voluble",
        "débito", "sintió", "accesorio", "falda", "sapiencia", "volutas", "queso",
        "permacultura", "laudo", "soluciones", "entero", "pan", "litro", "tonelada",
        "culpa", "libertario", "mosca", "dictado", "reincidente", "nascimiento", "dolor",
        "escolar", "impedimento", "mínima", "mayores", "repugnante", "dulce", "obcecado",
        "montaña", "enigma", "total", "deletéreo", "décima", "cábala", "fotografía",
    ],
};

fn vocabulary(lang: &str) -> &'static Vocabulary {
    match lang.to_lowercase().as_str() {
        "ru" => &RU,
        "sp" => &SP,
        _ => &LATIN,
    }
}

/// Replace a `lorem` node with a generated paragraph.
pub fn lorem(node: &mut AbbreviationNode, ancestors: &[Ancestor], config: &Config) {
    let Some(caps) = node.name.as_deref().and_then(|name| LOREM.captures(name)) else {
        return;
    };

    let vocab = vocabulary(caps.get(1).map_or("", |m| m.as_str()));
    let min = caps
        .get(2)
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .map_or(DEFAULT_WORD_COUNT, |n| n.max(1));
    let max = caps
        .get(3)
        .and_then(|m| m.as_str()[1..].parse::<usize>().ok())
        .map_or(min, |n| n.max(min));

    let mut rng = rand::thread_rng();
    let word_count = if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    };

    let repeat = node
        .repeat
        .or_else(|| ancestors.iter().rev().find_map(|a| a.repeat));
    let start_with_common = repeat.map_or(true, |r| r.value == 0);

    node.name = None;
    node.attributes.clear();
    node.value = vec![Value::Text(paragraph(
        &mut rng,
        vocab,
        word_count,
        start_with_common,
    ))];

    if node.repeat.is_some() && !ancestors.is_empty() {
        resolve_implicit_tag(node, ancestors, config);
    }
}

/// Random integer in `[from, to)`, or `from` for an empty range.
fn rand_range(rng: &mut impl Rng, from: usize, to: usize) -> usize {
    if to > from {
        rng.gen_range(from..to)
    } else {
        from
    }
}

fn paragraph(
    rng: &mut impl Rng,
    vocab: &Vocabulary,
    word_count: usize,
    start_with_common: bool,
) -> String {
    let mut result = Vec::new();
    let mut total = 0;

    if start_with_common {
        let words: Vec<&str> = vocab.common.iter().take(word_count).copied().collect();
        total += words.len();
        let words = insert_commas(rng, words);
        result.push(sentence(rng, words, Some('.')));
    }

    while total < word_count {
        let count = rand_range(rng, 2, 30).min(word_count - total);
        let words = sample(rng, vocab.words, count);
        total += words.len();
        let words = insert_commas(rng, words);
        result.push(sentence(rng, words, None));
    }

    result.join(" ")
}

/// `count` distinct words.
fn sample(rng: &mut impl Rng, words: &[&'static str], count: usize) -> Vec<&'static str> {
    let mut result: Vec<&str> = Vec::new();
    let iterations = count.min(words.len());
    while result.len() < iterations {
        let word = words[rng.gen_range(0..words.len())];
        if !result.contains(&word) {
            result.push(word);
        }
    }
    result
}

fn insert_commas(rng: &mut impl Rng, words: Vec<&str>) -> Vec<String> {
    let mut words: Vec<String> = words.into_iter().map(String::from).collect();
    let len = words.len();
    if len < 2 {
        return words;
    }

    let total_commas = match len {
        4..=6 => rand_range(rng, 0, 1),
        7..=12 => rand_range(rng, 0, 2),
        _ => rand_range(rng, 1, 4),
    };

    for _ in 0..total_commas {
        let pos = rand_range(rng, 0, len - 2);
        if !words[pos].ends_with(',') {
            words[pos].push(',');
        }
    }

    words
}

fn sentence(rng: &mut impl Rng, mut words: Vec<String>, end: Option<char>) -> String {
    if let Some(first) = words.first_mut() {
        *first = capitalize(first);
    }
    let end = end.unwrap_or_else(|| ['?', '!', '.'][rand_range(rng, 0, 3)]);
    format!("{}{end}", words.join(" "))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use expando_parser::Repeater;
    use pretty_assertions::assert_eq;

    fn words(node: &AbbreviationNode) -> Vec<String> {
        expando_parser::ast::value_to_string(&node.value)
            .split_whitespace()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_default_word_count() {
        let mut node = AbbreviationNode::named("lorem");
        lorem(&mut node, &[], &Config::default());
        assert_eq!(node.name, None);
        assert_eq!(words(&node).len(), 30);
        assert!(words(&node)[0].starts_with("Lorem"));
    }

    #[test]
    fn test_explicit_count() {
        let mut node = AbbreviationNode::named("lorem5");
        lorem(&mut node, &[], &Config::default());
        assert_eq!(words(&node).len(), 5);
    }

    #[test]
    fn test_count_range() {
        for _ in 0..20 {
            let mut node = AbbreviationNode::named("lipsum3-6");
            lorem(&mut node, &[], &Config::default());
            let count = words(&node).len();
            assert!((3..=6).contains(&count), "got {count} words");
        }
    }

    #[test]
    fn test_count_range_reaches_max() {
        let counts: Vec<usize> = (0..200)
            .map(|_| {
                let mut node = AbbreviationNode::named("lorem2-3");
                lorem(&mut node, &[], &Config::default());
                words(&node).len()
            })
            .collect();
        assert!(counts.contains(&3));
        assert!(counts.iter().all(|n| (2..=3).contains(n)));
    }

    #[test]
    fn test_repeated_copy_skips_common_sentence() {
        let mut node = AbbreviationNode::named("lorem8");
        node.repeat = Some(Repeater {
            count: 2,
            value: 1,
            implicit: false,
        });
        lorem(&mut node, &[], &Config::default());
        assert_eq!(words(&node).len(), 8);
        assert!(!words(&node)[0].starts_with("Lorem"));
    }

    #[test]
    fn test_not_lorem_untouched() {
        let mut node = AbbreviationNode::named("loremipsum1x");
        lorem(&mut node, &[], &Config::default());
        assert_eq!(node.name.as_deref(), Some("loremipsum1x"));
    }

    #[test]
    fn test_sample_is_distinct() {
        let mut rng = rand::thread_rng();
        let words = sample(&mut rng, LATIN.words, 25);
        let mut unique = words.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 25);
    }
}
