//! The `examtrack init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examtrack.toml").exists() {
        println!("examtrack.toml already exists, skipping.");
    } else {
        std::fs::write("examtrack.toml", SAMPLE_CONFIG)?;
        println!("Created examtrack.toml");
    }

    std::fs::create_dir_all("records")?;
    let example_path = std::path::Path::new("records/example.toml");
    if example_path.exists() {
        println!("records/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_RECORDS)?;
        println!("Created records/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit examtrack.toml with your daily, weekly and monthly targets");
    println!("  2. Run: examtrack validate --records records");
    println!("  3. Run: examtrack progress --records records --granularity daily");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examtrack configuration

default_granularity = "weekly"
accuracy_ladder = [0.0, 50.0, 75.0]

[targets]
daily = 80
weekly = 560
monthly = 2400
exam = 400
"#;

const EXAMPLE_RECORDS: &str = r#"# Exam sittings. Subject values are { correct, incorrect } pairs;
# a bare number is read as a correct count with no incorrect answers.

[[exams]]
student_id = "student"
date = "2024-03-02"
format = "LGS"
name = "Mock exam 1"
[exams.subjects]
turkish = { correct = 18, incorrect = 2 }
math = { correct = 14, incorrect = 4 }
science = { correct = 16, incorrect = 3 }
inkilap = 9
religion = 10
foreign_lang = { correct = 8, incorrect = 1 }

# Practice logs: one per student per day. Saving the same day again
# replaces the earlier log.

[[practice]]
student_id = "student"
date = "2024-03-04"
[practice.subjects]
"Paragraf" = { correct = 30, incorrect = 5 }
"Problemler" = { correct = 40, incorrect = 10 }

[[practice]]
student_id = "student"
date = "2024-03-05"
[practice.subjects]
"Paragraf" = { correct = 20, incorrect = 4 }
"#;
