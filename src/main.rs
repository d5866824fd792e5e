use std::env;
use std::path::PathBuf;
use std::process;

use quaderno::{
    BookletPipeline, GenerationOptions, HeadlessSurface, PipelineError, QuizFilter, RunSyntax,
};

/// A small CLI that runs the layout pipeline against the headless
/// surface and writes the placement listing. Real host bindings drive
/// the same pipeline through their own `LayoutSurface`.
fn main() -> Result<(), PipelineError> {
    quaderno::init_logging();

    let args: Vec<String> = env::args().collect();
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut options = GenerationOptions::default();
    let mut csv_mode = false;

    for arg in &args[1..] {
        match arg.as_str() {
            "--no-quiz" => options.include_quizzes = false,
            "--true-only" => options.quiz_filter = QuizFilter::TrueOnly,
            "--false-only" => options.quiz_filter = QuizFilter::FalseOnly,
            "--html" => options.run_syntax = RunSyntax::Html,
            "--csv" => csv_mode = true,
            "--help" | "-h" => {
                usage(&args[0]);
                return Ok(());
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ if output.is_none() => output = Some(PathBuf::from(arg)),
            other => {
                eprintln!("Unexpected argument: {other}");
                usage(&args[0]);
                process::exit(1);
            }
        }
    }

    let Some(input) = input else {
        usage(&args[0]);
        process::exit(1);
    };
    let output = output.unwrap_or_else(|| input.with_extension("layout.txt"));
    options.output = Some(output.clone());

    let pipeline = BookletPipeline::new(options);
    let mut surface = HeadlessSurface::new();
    let report = if csv_mode {
        pipeline.generate_quiz_booklet_from_csv(&mut surface, &input)?
    } else {
        pipeline.generate_from_file(&mut surface, &input)?
    };

    println!(
        "{}: {} page(s), {} template(s){} -> {}",
        input.display(),
        report.pages,
        report.templates,
        if report.limit_reached {
            ", template limit reached"
        } else {
            ""
        },
        output.display()
    );
    Ok(())
}

fn usage(program: &str) {
    eprintln!("Lay out a course JSON (or quiz CSV) into a paginated booklet.");
    eprintln!();
    eprintln!("Usage: {program} <course.json> [output] [flags]");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --csv         input is the quiz CSV (Chapter,QuestionID,...)");
    eprintln!("  --html        template text uses HTML markup instead of markdown");
    eprintln!("  --no-quiz     skip quiz sections");
    eprintln!("  --true-only   keep only true questions");
    eprintln!("  --false-only  keep only false questions");
}
