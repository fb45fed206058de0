use crate::cli::TasksArgs;
use crate::exit_codes;
use crate::output;
use serde::Serialize;
use telemetry_rs::TaskKind;

#[derive(Serialize)]
struct TaskInfo {
    name: &'static str,
    description: &'static str,
}

pub fn execute(args: TasksArgs) -> i32 {
    let tasks: Vec<TaskInfo> = TaskKind::ALL
        .into_iter()
        .map(|kind| TaskInfo {
            name: kind.name(),
            description: kind.description(),
        })
        .collect();

    if args.json {
        if let Err(e) = output::emit(&tasks, false, None) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    } else {
        println!("Available analytics tasks:\n");
        println!("  {:<16} {}", "Task", "Description");
        println!("  {}", "-".repeat(72));
        for t in &tasks {
            println!("  {:<16} {}", t.name, t.description);
        }
        println!();
        println!("Request format: {{\"id\": \"1\", \"task\": \"aggregate\", \"data\": {{...}}}}");
    }

    exit_codes::SUCCESS
}
