//! End-to-end pipeline tests driving the headless surface.

use quaderno::surface::PlacedKind;
use quaderno::{
    BookletPipeline, GenerationOptions, HeadlessSurface, ImageCatalog, QuizFilter,
};

fn texts(surface: &HeadlessSurface) -> Vec<String> {
    surface
        .elements()
        .iter()
        .filter_map(|e| match &e.kind {
            PlacedKind::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn generate(json: &str, options: GenerationOptions) -> (HeadlessSurface, quaderno::GenerationReport) {
    let course = quaderno::source::parse_course(json).unwrap();
    let mut surface = HeadlessSurface::new();
    let report = BookletPipeline::new(options)
        .generate(&mut surface, &course, &ImageCatalog::new("/nonexistent"))
        .unwrap();
    (surface, report)
}

const COURSE: &str = r#"{
  "areas": [{
    "name": "Segnaletica",
    "desc": "I segnali stradali e il loro significato nelle varie situazioni di guida quotidiana",
    "chapters": [{
      "name": "Segnali di pericolo",
      "topics": [{
        "name": "Curve",
        "modules": [{
          "name": "Curve pericolose",
          "templates": [
            {"id": "1", "text": ["**Curva a destra**: il segnale presegnala una curva pericolosa"],
             "quiz": [
               {"que": "Il segnale presegnala una curva a destra", "is_true": true},
               {"que": "Il segnale indica un tornante", "is_true": false}
             ]},
            {"id": "2", "text": ["Testo con superficie di 50 cm3 indicata"],
             "videos": ["curva.mp4"]}
          ]
        }]
      }]
    }]
  }]
}"#;

#[test]
fn full_course_produces_headers_content_and_quiz() {
    let (surface, report) = generate(COURSE, GenerationOptions::default());
    assert_eq!(report.templates, 2);
    assert!(!report.limit_reached);

    let texts = texts(&surface);
    for expected in [
        "Segnaletica",
        "Segnali di pericolo",
        "Curve",
        "Curve pericolose",
        "Quiz",
        "[video: curva.mp4]",
    ] {
        assert!(
            texts.iter().any(|t| t == expected),
            "missing '{expected}' in {texts:?}"
        );
    }
    // Markdown bold parsed away, superscript units normalized.
    assert!(texts.iter().any(|t| t.contains("Curva a destra")));
    assert!(texts.iter().any(|t| t.contains("cm³")));
    assert!(!texts.iter().any(|t| t.contains("**")));
}

#[test]
fn quiz_filter_drops_the_other_verdict() {
    let options = GenerationOptions {
        quiz_filter: QuizFilter::FalseOnly,
        ..GenerationOptions::default()
    };
    let (surface, _) = generate(COURSE, options);
    let texts = texts(&surface);
    assert!(texts.iter().any(|t| t.contains("tornante")));
    assert!(!texts.iter().any(|t| t.contains("curva a destra")));
}

#[test]
fn every_page_carries_a_page_number() {
    let long = "parole di riempimento ".repeat(2000);
    let json = format!(
        r#"{{"areas":[{{"name":"A","chapters":[{{"name":"C","topics":[{{"name":"T",
            "modules":[{{"name":"M","templates":[{{"id":"1","text":["{long}"]}}]}}]}}]}}]}}]}}"#
    );
    let course = quaderno::source::parse_course(&json).unwrap();
    let mut surface = HeadlessSurface::new();
    let config = quaderno::LayoutConfig {
        column_mode: quaderno::ColumnMode::Single,
        ..quaderno::LayoutConfig::default()
    };
    let report = BookletPipeline::new(GenerationOptions::default())
        .with_config(config)
        .generate(&mut surface, &course, &ImageCatalog::new("/nonexistent"))
        .unwrap();
    assert!(report.pages > 1);

    for page in 1..=report.pages {
        let has_number = surface.elements_on_page(page).iter().any(|e| match &e.kind {
            PlacedKind::Text { text, .. } => *text == page.to_string(),
            _ => false,
        });
        assert!(has_number, "page {page} has no page number");
    }
}

#[test]
fn missing_areas_aborts_before_any_layout() {
    assert!(quaderno::source::parse_course(r#"{"topics": []}"#).is_err());
}

#[test]
fn a_course_file_round_trips_to_an_exported_listing() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("course.json");
    std::fs::write(&json_path, COURSE).unwrap();
    let output = dir.path().join("course.layout.txt");

    let options = GenerationOptions {
        output: Some(output.clone()),
        ..GenerationOptions::default()
    };
    let mut surface = HeadlessSurface::new();
    let report = BookletPipeline::new(options)
        .generate_from_file(&mut surface, &json_path)
        .unwrap();
    assert_eq!(report.templates, 2);

    let listing = std::fs::read_to_string(output).unwrap();
    assert!(listing.contains("page 1"));
    assert!(listing.contains("Quiz"));
}

#[test]
fn quiz_booklet_splits_long_questions_across_pages() {
    let mut csv = String::from("Chapter,QuestionID,QuestionText,AnswerNumber,AnswerText,CorrectFlag\n");
    for q in 0..12 {
        for a in 0..4 {
            csv.push_str(&format!(
                "1a,Q{q:02},Domanda numero {q} sulla precedenza,{a},Risposta {a} alla domanda,{}\n",
                u8::from(a == 0)
            ));
        }
    }
    let questions = quaderno::source::parse_quiz_csv(csv.as_bytes()).unwrap();
    let mut surface = HeadlessSurface::new();
    let report = BookletPipeline::default()
        .generate_quiz_booklet(&mut surface, &questions)
        .unwrap();
    // 12 cards x (header + 4 rows) cannot fit one page.
    assert!(report.pages > 1);

    // Every answer row made it somewhere.
    let texts = texts(&surface);
    for q in 0..12 {
        assert!(
            texts
                .iter()
                .any(|t| t.contains(&format!("Domanda numero {q} "))
                    || t.contains(&format!("Domanda numero {q}"))),
            "question {q} missing"
        );
    }
}
