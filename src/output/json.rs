use crate::model::GradeReport;
use anyhow::Result;

pub fn print_json(report: &GradeReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}
