//! Student registration and activity commands

use anyhow::{bail, Result};
use clap::Args;

use super::utils::{open_store, parse_csv, GlobalOptions};
use crate::config::CliOverrides;
use crate::domain::{FeedbackRecord, PreferenceRecord, Student, TranscriptEntry};
use crate::error::RecommendError;
use crate::render::{render_json, render_json_lines, OutputFormat, Table};

#[derive(Args)]
pub struct AddStudentArgs {
    /// Student id
    #[arg(value_name = "ID")]
    pub id: String,

    /// Full name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: Option<String>,

    /// Home kulliyyah
    #[arg(long)]
    pub kulliyyah: Option<String>,

    #[arg(long)]
    pub programme: Option<String>,
}

pub fn run_add_student(args: AddStudentArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let store = open_store(&config)?;
    let student = Student {
        id: args.id.trim().to_string(),
        name: args.name,
        email: args.email,
        kulliyyah: args.kulliyyah,
        programme: args.programme,
    };
    store.add_student(&student)?;
    println!("Registered student {}", student.id);
    Ok(())
}

#[derive(Args)]
pub struct StudentsArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run_students(args: StudentsArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let students = open_store(&config)?.students()?;
    match args.format {
        OutputFormat::Text if students.is_empty() => println!("No students registered."),
        OutputFormat::Text => {
            let mut table = Table::new(["Id", "Name", "Kulliyyah", "Programme"]);
            for s in &students {
                table.add_row(vec![
                    s.id.clone(),
                    s.name.clone(),
                    s.kulliyyah.clone().unwrap_or_default(),
                    s.programme.clone().unwrap_or_default(),
                ]);
            }
            print!("{}", table.render());
        }
        OutputFormat::Json => print!("{}", render_json(&students)?),
        OutputFormat::Jsonl => print!("{}", render_json_lines(&students)?),
    }
    Ok(())
}

#[derive(Args)]
pub struct PreferencesArgs {
    /// Student id
    #[arg(value_name = "STUDENT")]
    pub student: String,

    /// Preferred kulliyyah; matching courses are boosted
    #[arg(long)]
    pub kulliyyah: Option<String>,

    /// Preferred course types (comma-separated, e.g. 'Practical,Theory')
    #[arg(long, value_name = "TYPES")]
    pub types: Option<String>,

    /// Free-text interests and goals
    #[arg(long, value_name = "TEXT")]
    pub topics: Option<String>,

    /// Course codes never to recommend (comma-separated)
    #[arg(long, value_name = "CODES")]
    pub avoid: Option<String>,

    /// Preferred class time
    #[arg(long, value_name = "TIME")]
    pub time: Option<String>,

    #[arg(long)]
    pub semester: Option<u32>,

    #[arg(long)]
    pub cgpa: Option<f64>,

    /// Print the latest stored preference instead of recording a new one
    #[arg(long)]
    pub show: bool,
}

pub fn run_preferences(args: PreferencesArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let store = open_store(&config)?;

    if args.show {
        match store.latest_preference(&args.student)? {
            Ok(Some(pref)) => print!("{}", render_json(&pref)?),
            Ok(None) => println!("No preferences recorded for {}", args.student),
            Err(RecommendError::InvalidPreferenceData(reason)) => {
                bail!("Stored preference for {} is unreadable: {}", args.student, reason)
            }
            Err(err) => return Err(err.into()),
        }
        return Ok(());
    }

    let mut pref = PreferenceRecord::new(args.student.trim());
    pref.kulliyyah = args.kulliyyah;
    pref.preferred_types = parse_csv(&args.types).unwrap_or_default();
    pref.topics = args.topics.unwrap_or_default();
    pref.courses_to_avoid = parse_csv(&args.avoid).unwrap_or_default();
    pref.preferred_time = args.time;
    pref.semester = args.semester;
    pref.cgpa = args.cgpa;
    store.save_preference(&pref)?;
    println!("Saved preferences for {}", pref.student_id);
    Ok(())
}

#[derive(Args)]
pub struct FeedbackArgs {
    /// Student id
    #[arg(value_name = "STUDENT")]
    pub student: String,

    /// Course code
    #[arg(value_name = "COURSE")]
    pub course: String,

    /// Rating from 1 to 5
    #[arg(value_name = "RATING")]
    pub rating: u8,

    /// Optional comment; used as interest text for students without preferences
    #[arg(long)]
    pub comment: Option<String>,
}

pub fn run_feedback(args: FeedbackArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let store = open_store(&config)?;
    let mut record = FeedbackRecord::new(args.student, args.course, args.rating);
    record.comment = args.comment.unwrap_or_default();
    store.submit_feedback(&record)?;
    println!("Recorded rating {} for {} by {}", record.rating, record.course_code, record.student_id);
    Ok(())
}

#[derive(Args)]
pub struct EnrollmentArgs {
    /// Student id
    #[arg(value_name = "STUDENT")]
    pub student: String,

    /// Course code
    #[arg(value_name = "COURSE")]
    pub course: String,
}

pub fn run_enroll(args: EnrollmentArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let store = open_store(&config)?;
    let enrollment = store.enroll(&args.student, &args.course)?;
    println!("Enrolled {} in {}", enrollment.student_id, enrollment.course_code);
    Ok(())
}

pub fn run_drop(args: EnrollmentArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let store = open_store(&config)?;
    store.drop_enrollment(&args.student, &args.course)?;
    println!("Dropped {} from {}", args.student, args.course);
    Ok(())
}

#[derive(Args)]
pub struct TranscriptArgs {
    /// Student id
    #[arg(value_name = "STUDENT")]
    pub student: String,

    /// Record a completed course instead of listing the transcript
    #[arg(long, value_name = "COURSE")]
    pub add: Option<String>,

    /// Semester the course was taken (with --add)
    #[arg(long, requires = "add")]
    pub semester: Option<u32>,

    /// Grade obtained (with --add)
    #[arg(long, requires = "add")]
    pub grade: Option<String>,
}

pub fn run_transcript(args: TranscriptArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let store = open_store(&config)?;

    if let Some(course) = args.add {
        let entry = TranscriptEntry {
            student_id: args.student.clone(),
            course_code: course,
            semester_taken: args.semester,
            grade: args.grade,
        };
        store.add_transcript_entry(&entry)?;
        println!("Added {} to the transcript of {}", entry.course_code, entry.student_id);
        return Ok(());
    }

    let entries = store.transcript(&args.student)?;
    let enrollments = store.enrollments(&args.student)?;
    if entries.is_empty() && enrollments.is_empty() {
        println!("No courses recorded for {}", args.student);
        return Ok(());
    }

    let mut table = Table::new(["Course", "Status", "Semester", "Grade"]);
    for e in &entries {
        table.add_row(vec![
            e.course_code.clone(),
            "completed".to_string(),
            e.semester_taken.map(|s| s.to_string()).unwrap_or_default(),
            e.grade.clone().unwrap_or_default(),
        ]);
    }
    for e in &enrollments {
        table.add_row(vec![e.course_code.clone(), e.status.to_string(), String::new(), String::new()]);
    }
    print!("{}", table.render());
    Ok(())
}
