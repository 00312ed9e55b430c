use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::{
    BuildOptions, Connection, Database, JMDICT_DB_VERSION, KANJIDIC2_DB_VERSION, build_jmdict,
    build_kanjidic2,
};

pub const CAT: u32 = 1000010;
pub const DOG: u32 = 1000020;
pub const TABERU: u32 = 1000030;
pub const NEKOJITA: u32 = 1000040;

pub const JMDICT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE JMdict [
<!ELEMENT JMdict (entry*)>
<!ENTITY n "noun (common) (futsuumeishi)">
<!ENTITY v1 "Ichidan verb">
<!ENTITY vt "transitive verb">
<!ENTITY uk "word usually written using kana alone">
<!ENTITY ksb "Kansai-ben">
]>
<JMdict>
<entry>
<ent_seq>1000010</ent_seq>
<k_ele><keb>猫</keb><ke_pri>ichi1</ke_pri><ke_pri>nf03</ke_pri></k_ele>
<r_ele><reb>ねこ</reb><re_pri>ichi1</re_pri></r_ele>
<sense>
<pos>&n;</pos>
<gloss>cat</gloss>
</sense>
</entry>
<entry>
<ent_seq>1000020</ent_seq>
<r_ele><reb>いぬ</reb><re_pri>ichi1</re_pri></r_ele>
<sense>
<pos>&n;</pos>
<gloss>dog</gloss>
</sense>
</entry>
<entry>
<ent_seq>1000030</ent_seq>
<k_ele><keb>食べる</keb><ke_pri>nf05</ke_pri></k_ele>
<k_ele><keb>喰べる</keb></k_ele>
<r_ele><reb>たべる</reb><re_restr>食べる</re_restr></r_ele>
<r_ele><reb>くう</reb><re_nokanji/></r_ele>
<sense>
<stagk>食べる</stagk>
<pos>&v1;</pos>
<pos>&vt;</pos>
<misc>&uk;</misc>
<dial>&ksb;</dial>
<s_inf>colloquial</s_inf>
<gloss>to eat</gloss>
</sense>
</entry>
<entry>
<ent_seq>1000040</ent_seq>
<k_ele><keb>猫舌</keb></k_ele>
<r_ele><reb>ねこじた</reb></r_ele>
<sense>
<pos>&n;</pos>
<gloss>sensitivity to hot food</gloss>
<gloss>person who dislikes hot food</gloss>
</sense>
</entry>
</JMdict>
"#;

pub const KANJIDIC2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kanjidic2>
<header><file_version>4</file_version></header>
<character>
<literal>猫</literal>
<misc>
<grade>8</grade>
<stroke_count>11</stroke_count>
<freq>1702</freq>
<jlpt>2</jlpt>
</misc>
<query_code>
<q_code qc_type="skip">1-3-8</q_code>
<q_code qc_type="four_corner">4426.0</q_code>
</query_code>
<reading_meaning>
<rmgroup>
<reading r_type="ja_on">ビョウ</reading>
<reading r_type="ja_kun">ねこ</reading>
<meaning>cat</meaning>
<meaning m_lang="fr">chat</meaning>
</rmgroup>
</reading_meaning>
</character>
<character>
<literal>休</literal>
<misc>
<grade>1</grade>
<stroke_count>6</stroke_count>
<freq>611</freq>
<jlpt>4</jlpt>
</misc>
<query_code>
<q_code qc_type="skip">1-2-4</q_code>
</query_code>
<reading_meaning>
<rmgroup>
<reading r_type="ja_on">キュウ</reading>
<reading r_type="ja_kun">やす.む</reading>
<meaning>rest</meaning>
<meaning>day off</meaning>
</rmgroup>
<nanori>よし</nanori>
</reading_meaning>
</character>
</kanjidic2>
"#;

/// 猫 nests 丿 inside 犭, so its root components are 犭 and 苗. 犭 has its
/// own drawing but no KANJIDIC2 entry.
pub const KANJIVG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kanjivg xmlns:kvg="http://kanjivg.tagaini.net">
<kanji id="kvg:kanji_0732b">
<g id="kvg:0732b" kvg:element="猫">
  <g id="kvg:0732b-g1" kvg:element="犭" kvg:original="犬">
    <path id="kvg:0732b-s1" kvg:type="㇒" d="M1,1"/>
    <g id="kvg:0732b-g2" kvg:element="丿">
      <path id="kvg:0732b-s2" kvg:type="㇇" d="M2,2"/>
      <path id="kvg:0732b-s3" kvg:type="㇒" d="M3,3"/>
    </g>
  </g>
  <g id="kvg:0732b-g3" kvg:element="苗">
    <path id="kvg:0732b-s4" kvg:type="㇐" d="M4,4"/>
    <path id="kvg:0732b-s5" kvg:type="㇑" d="M5,5"/>
    <path id="kvg:0732b-s6" kvg:type="㇑" d="M6,6"/>
  </g>
</g>
</kanji>
<kanji id="kvg:kanji_04f11">
<g id="kvg:04f11" kvg:element="休">
  <g id="kvg:04f11-g1" kvg:element="亻" kvg:original="人">
    <path kvg:type="㇒" d="M7,7"/>
    <path kvg:type="㇑" d="M8,8"/>
  </g>
  <g id="kvg:04f11-g2" kvg:element="木">
    <path kvg:type="㇐" d="M9,9"/>
    <path kvg:type="㇑" d="M10,10"/>
    <path kvg:type="㇒" d="M11,11"/>
    <path kvg:type="㇏" d="M12,12"/>
  </g>
</g>
</kanji>
<kanji id="kvg:kanji_072ad">
<g id="kvg:072ad" kvg:element="犭">
  <path kvg:type="㇒" d="M13,13"/>
  <path kvg:type="㇇" d="M14,14"/>
  <path kvg:type="㇒" d="M15,15"/>
</g>
</kanji>
</kanjivg>
"#;

/// Both dictionaries built into a temporary directory
pub struct Fixture {
    pub dir: TempDir,
    pub jmdict: PathBuf,
    pub kanjidic2: PathBuf,
}

pub fn build() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let jmdict = dir.path().join("jmdict.db");
    let kanjidic2 = dir.path().join("kanjidic2.db");
    let options = BuildOptions::default();

    build_jmdict(JMDICT.as_bytes(), &jmdict, &options).expect("jmdict build");
    let mut strokes = KANJIVG.as_bytes();
    build_kanjidic2(
        KANJIDIC2.as_bytes(),
        Some(&mut strokes as &mut dyn BufRead),
        &kanjidic2,
        &options,
    )
    .expect("kanjidic2 build");

    Fixture {
        dir,
        jmdict,
        kanjidic2,
    }
}

/// Inline connection with both dictionaries attached
pub fn connection(fixture: &Fixture) -> Connection {
    let mut conn = Connection::open_in_memory().expect("user store");
    conn.attach(&fixture.jmdict, "jmdict", JMDICT_DB_VERSION)
        .expect("attach jmdict");
    conn.attach(&fixture.kanjidic2, "kanjidic2", KANJIDIC2_DB_VERSION)
        .expect("attach kanjidic2");
    conn
}

/// Worker-backed database with the word dictionary and, optionally, the
/// kanji dictionary attached
pub fn database(fixture: &Fixture, with_kanji: bool) -> Arc<Database> {
    let db = Database::open_in_memory().expect("database");
    db.attach(&fixture.jmdict, "jmdict", JMDICT_DB_VERSION)
        .expect("attach jmdict");
    if with_kanji {
        db.attach(&fixture.kanjidic2, "kanjidic2", KANJIDIC2_DB_VERSION)
            .expect("attach kanjidic2");
    }
    Arc::new(db)
}
