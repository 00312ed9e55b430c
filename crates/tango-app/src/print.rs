use std::fmt::Write;

use tango_core::{Entry, KanjiEntry, WordEntry};

/// Plain-text rendering of an entry for the terminal
pub fn describe(entry: &Entry, misc_filter: u64) -> String {
    match entry {
        Entry::Word(word) => describe_word(word, misc_filter),
        Entry::Kanji(kanji) => describe_kanji(kanji),
    }
}

fn describe_word(word: &WordEntry, misc_filter: u64) -> String {
    let mut out = String::new();
    let readings: Vec<&str> = word.readings.iter().map(|r| r.text.as_str()).collect();
    if word.writings.is_empty() {
        let _ = write!(out, "{}", readings.join("、"));
    } else {
        let writings: Vec<&str> = word.writings.iter().map(|w| w.text.as_str()).collect();
        let _ = write!(out, "{} 【{}】", writings.join("、"), readings.join("、"));
    }

    for (number, sense) in word.relevant_senses(misc_filter, 0).enumerate() {
        let glosses: Vec<&str> = sense.glosses.values().map(String::as_str).collect();
        let _ = write!(out, "\n  {}. {}", number + 1, glosses.join(" / "));
        if !sense.notes.is_empty() {
            let _ = write!(out, " ({})", sense.notes.join("; "));
        }
    }
    out
}

fn describe_kanji(kanji: &KanjiEntry) -> String {
    let mut out = kanji.literal.to_string();
    if !kanji.in_dictionary {
        out.push_str(" (component)");
    }

    let on: Vec<&str> = kanji.onyomi().collect();
    let kun: Vec<&str> = kanji.kunyomi().collect();
    if !on.is_empty() {
        let _ = write!(out, "\n  on: {}", on.join("、"));
    }
    if !kun.is_empty() {
        let _ = write!(out, "\n  kun: {}", kun.join("、"));
    }
    if !kanji.nanori.is_empty() {
        let _ = write!(out, "\n  nanori: {}", kanji.nanori.join("、"));
    }

    let meanings: Vec<&str> = kanji.meanings_in("en").collect();
    if !meanings.is_empty() {
        let _ = write!(out, "\n  {}", meanings.join(", "));
    }

    let mut facts = Vec::new();
    if let Some(strokes) = kanji.stroke_count {
        facts.push(format!("{strokes} strokes"));
    }
    if let Some(grade) = kanji.grade {
        facts.push(format!("grade {grade}"));
    }
    if let Some(jlpt) = kanji.jlpt {
        facts.push(format!("JLPT {jlpt}"));
    }
    if let Some(frequency) = kanji.frequency {
        facts.push(format!("frequency #{frequency}"));
    }
    if let Some(skip) = &kanji.skip {
        facts.push(format!("SKIP {skip}"));
    }
    if !facts.is_empty() {
        let _ = write!(out, "\n  {}", facts.join(", "));
    }

    let roots: Vec<String> = kanji
        .root_components()
        .iter()
        .map(|c| c.repr(false).to_string())
        .collect();
    if !roots.is_empty() {
        let _ = write!(out, "\n  components: {}", roots.join(" "));
    }
    out
}
