use std::path::{Path, PathBuf};

use crate::{
    classify::{self, Classification},
    constants::JAVA_COMBINED_CLASS,
    core::{
        domain::{ExecutionRequest, Language, ToolchainCommand},
        traits::{
            process::ProcessOutput,
            toolchain::{RunMode, Toolchain, ToolchainError, ToolchainPlan},
        },
    },
    layout::{java_class_name, java_declared_types},
    toolchain::{file_stem, read_source, resolve_dependency},
};

#[derive(Clone, Debug)]
pub struct JavaToolchain {
    javac: PathBuf,
    java: PathBuf,
    junit_jar: PathBuf,
}

impl JavaToolchain {
    pub fn new<C, R, J>(javac: C, java: R, junit_jar: J) -> Self
    where
        C: AsRef<Path>,
        R: AsRef<Path>,
        J: AsRef<Path>,
    {
        Self {
            javac: javac.as_ref().into(),
            java: java.as_ref().into(),
            junit_jar: junit_jar.as_ref().into(),
        }
    }

    fn launcher(plan: &ToolchainPlan) -> &Path {
        plan.dependency.as_deref().unwrap_or(Path::new(""))
    }
}

impl Toolchain for JavaToolchain {
    fn language(&self) -> Language {
        Language::Java
    }

    fn prepare(&self, request: &ExecutionRequest) -> Result<ToolchainPlan, ToolchainError> {
        let solution = read_source(&request.solution_path)?;
        let stem = file_stem(&request.solution_path);
        // `Main.java` may hold several non-public classes; `Main` is the entry.
        let entry = if stem == JAVA_COMBINED_CLASS {
            stem.clone()
        } else {
            java_class_name(&solution).unwrap_or_else(|| stem.clone())
        };

        let mut types = java_declared_types(&solution);
        let plan = match &request.test_path {
            Some(test_path) if stem != JAVA_COMBINED_CLASS => {
                let test = read_source(test_path)?;
                types.extend(java_declared_types(&test));
                let expected = classify::java::count_test_annotations(&test);
                let jar = resolve_dependency(&request.work_dir, &self.junit_jar, expected)?;
                ToolchainPlan::discovery(expected).with_dependency(jar)
            }
            _ => ToolchainPlan::script(),
        };

        let artifacts = types
            .iter()
            .map(|name| request.work_dir.join(format!("{name}.class")))
            .collect();
        Ok(plan.with_entry(entry).with_artifacts(artifacts))
    }

    fn compile_command(
        &self,
        request: &ExecutionRequest,
        plan: &ToolchainPlan,
    ) -> Option<ToolchainCommand> {
        let command = ToolchainCommand::new(&self.javac, &request.work_dir);
        let command = match plan.mode {
            RunMode::Discovery => command
                .arg("-cp")
                .arg(Self::launcher(plan))
                .arg("-d")
                .arg(&request.work_dir)
                .args(request.source_files()),
            RunMode::Script => command
                .arg("-d")
                .arg(&request.work_dir)
                .arg(&request.solution_path),
        };
        Some(command)
    }

    fn run_command(&self, request: &ExecutionRequest, plan: &ToolchainPlan) -> ToolchainCommand {
        let command = ToolchainCommand::new(&self.java, &request.work_dir);
        match plan.mode {
            RunMode::Discovery => command
                .arg("-jar")
                .arg(Self::launcher(plan))
                .arg("--class-path")
                .arg(&request.work_dir)
                .args(["--scan-class-path", "--disable-banner"]),
            RunMode::Script => command
                .arg("-cp")
                .arg(&request.work_dir)
                .arg(plan.entry.as_deref().unwrap_or(JAVA_COMBINED_CLASS)),
        }
    }

    fn classify(&self, plan: &ToolchainPlan, output: &ProcessOutput) -> Classification {
        match plan.mode {
            RunMode::Discovery => classify::java::classify_discovery(plan.expected_tests, output),
            RunMode::Script => classify::java::classify_main(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const SOLUTION: &str = "
import java.util.*;

public class Palindrome {
    public static boolean check(String s) {
        return new StringBuilder(s).reverse().toString().equals(s);
    }
}
";

    const TESTS: &str = "
import org.junit.jupiter.api.Test;
import static org.junit.jupiter.api.Assertions.*;

class PalindromeTest {
    @Test
    void empty() { assertTrue(Palindrome.check(\"\")); }

    @Test
    void word() { assertTrue(Palindrome.check(\"level\")); }
}
";

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_main_file_runs_directly() {
        let dir = TempDir::new().unwrap();
        let main = write(
            dir.path(),
            "Main.java",
            "public class Main { public static void main(String[] a) {} }",
        );
        let test = write(dir.path(), "Extra.java", "class Extra {}");
        let request = ExecutionRequest::new(Language::Java, &main, Some(test), dir.path());
        let toolchain = JavaToolchain::new("javac", "java", "lib/junit.jar");

        let plan = toolchain.prepare(&request).unwrap();
        assert_eq!(plan.mode, RunMode::Script);
        assert_eq!(plan.entry.as_deref(), Some("Main"));
        assert_eq!(plan.artifacts, vec![dir.path().join("Main.class")]);

        let compile = toolchain.compile_command(&request, &plan).unwrap();
        assert_eq!(
            compile.args_lossy(),
            vec![
                "-d".to_string(),
                dir.path().display().to_string(),
                main.display().to_string()
            ]
        );
        let run = toolchain.run_command(&request, &plan);
        assert_eq!(run.args_lossy().last().map(String::as_str), Some("Main"));
    }

    #[test]
    fn test_main_file_with_several_classes_runs_main() {
        let dir = TempDir::new().unwrap();
        let main = write(
            dir.path(),
            "Main.java",
            "class Solution { static int twice(int x) { return 2 * x; } }\n\
             class Main { public static void main(String[] a) { System.out.println(Solution.twice(2)); } }",
        );
        let request = ExecutionRequest::new(Language::Java, &main, None, dir.path());
        let toolchain = JavaToolchain::new("javac", "java", "lib/junit.jar");

        let plan = toolchain.prepare(&request).unwrap();
        assert_eq!(plan.mode, RunMode::Script);
        assert_eq!(plan.entry.as_deref(), Some("Main"));
        assert_eq!(
            plan.artifacts,
            vec![dir.path().join("Solution.class"), dir.path().join("Main.class")]
        );

        let run = toolchain.run_command(&request, &plan);
        assert_eq!(
            run.args_lossy(),
            vec!["-cp".to_string(), dir.path().display().to_string(), "Main".to_string()]
        );
    }

    #[test]
    fn test_entry_follows_declared_class_name() {
        let dir = TempDir::new().unwrap();
        let solution = write(
            dir.path(),
            "Solution.java",
            "class Runner { public static void main(String[] a) {} }",
        );
        let request = ExecutionRequest::new(Language::Java, &solution, None, dir.path());
        let toolchain = JavaToolchain::new("javac", "java", "lib/junit.jar");

        let plan = toolchain.prepare(&request).unwrap();
        assert_eq!(plan.entry.as_deref(), Some("Runner"));
        let run = toolchain.run_command(&request, &plan);
        assert_eq!(run.args_lossy().last().map(String::as_str), Some("Runner"));
    }

    #[test]
    fn test_discovery_mode_uses_junit_launcher() {
        let dir = TempDir::new().unwrap();
        let solution = write(dir.path(), "Palindrome.java", SOLUTION);
        let test = write(dir.path(), "PalindromeTest.java", TESTS);
        let jar = write(dir.path(), "lib/junit.jar", "");
        let request =
            ExecutionRequest::new(Language::Java, &solution, Some(test.clone()), dir.path());
        let toolchain = JavaToolchain::new("javac", "java", "lib/junit.jar");

        let plan = toolchain.prepare(&request).unwrap();
        assert_eq!(plan.mode, RunMode::Discovery);
        assert_eq!(plan.expected_tests, 2);
        assert_eq!(plan.dependency.as_deref(), Some(jar.as_path()));
        assert_eq!(
            plan.artifacts,
            vec![
                dir.path().join("Palindrome.class"),
                dir.path().join("PalindromeTest.class")
            ]
        );
        assert!(toolchain.run_from_work_dir(&plan));

        let compile = toolchain.compile_command(&request, &plan).unwrap();
        assert_eq!(
            compile.args_lossy(),
            vec![
                "-cp".to_string(),
                jar.display().to_string(),
                "-d".to_string(),
                dir.path().display().to_string(),
                solution.display().to_string(),
                test.display().to_string(),
            ]
        );

        let run = toolchain.run_command(&request, &plan);
        assert_eq!(run.program_lossy(), "java");
        assert_eq!(
            run.args_lossy(),
            vec![
                "-jar".to_string(),
                jar.display().to_string(),
                "--class-path".to_string(),
                dir.path().display().to_string(),
                "--scan-class-path".to_string(),
                "--disable-banner".to_string(),
            ]
        );
    }

    #[test]
    fn test_discovery_without_launcher_is_an_error() {
        let dir = TempDir::new().unwrap();
        let solution = write(dir.path(), "Palindrome.java", SOLUTION);
        let test = write(dir.path(), "PalindromeTest.java", TESTS);
        let request = ExecutionRequest::new(Language::Java, &solution, Some(test), dir.path());

        let err = JavaToolchain::new("javac", "java", "lib/junit.jar")
            .prepare(&request)
            .unwrap_err();
        assert!(matches!(err, ToolchainError::MissingDependency { .. }));
        assert_eq!(err.expected_tests(), 2);
    }
}
