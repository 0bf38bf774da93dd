// src/core/frameworks.rs

use crate::core::command::ShellCommand;
use crate::models::{Framework, TaskAction};

/// Framework-specific entries of the interactive menu, in display order.
pub fn menu_actions(framework: Option<Framework>) -> Vec<TaskAction> {
    let mut actions = match framework {
        Some(Framework::NestJs) => vec![
            TaskAction::InstallDependencies,
            TaskAction::PrismaGenerate,
            TaskAction::PrismaMigrate,
            TaskAction::Build,
        ],
        Some(Framework::ExpressJs) => vec![TaskAction::InstallDependencies],
        None => Vec::new(),
    };
    actions.push(TaskAction::UpdateEnvVar);
    actions.push(TaskAction::Continue);
    actions
}

/// Steps run unconditionally, in order, when the deployment is not interactive.
pub fn scripted_steps(framework: Option<Framework>) -> &'static [TaskAction] {
    match framework {
        Some(Framework::NestJs) => &[TaskAction::PrismaGenerate, TaskAction::Build],
        Some(Framework::ExpressJs) => &[TaskAction::InstallDependencies],
        None => &[],
    }
}

/// The remote command behind a build action. `None` for the menu-only actions.
pub fn command_for(action: TaskAction) -> Option<ShellCommand> {
    match action {
        TaskAction::InstallDependencies => Some(ShellCommand::new("npm").flag("install")),
        TaskAction::PrismaGenerate => {
            Some(ShellCommand::new("npx").flag("prisma").flag("generate"))
        }
        TaskAction::PrismaMigrate => Some(
            ShellCommand::new("npx")
                .flag("prisma")
                .flag("migrate")
                .flag("deploy"),
        ),
        TaskAction::Build => Some(ShellCommand::new("npm").flag("run").flag("build")),
        TaskAction::UpdateEnvVar | TaskAction::Continue => None,
    }
}
