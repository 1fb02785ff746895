pub const PYTHON_PROGRAM: &str = "python3";
pub const JAVAC_PROGRAM: &str = "javac";
pub const JAVA_PROGRAM: &str = "java";
pub const NODE_PROGRAM: &str = "node";
pub const CXX_PROGRAM: &str = "g++";
pub const GO_PROGRAM: &str = "go";

/// Relative paths resolve against the request's work directory.
pub const JUNIT_JAR_PATH: &str = "lib/junit-platform-console-standalone.jar";
pub const JEST_PATH: &str = "node_modules/.bin/jest";

pub const SOLUTION_BASENAME: &str = "solution";
pub const TEST_BASENAME: &str = "test_cases";
pub const COMBINED_BASENAME: &str = "main";
pub const JAVA_COMBINED_CLASS: &str = "Main";
pub const JAVA_DEFAULT_CLASS: &str = "Solution";

pub const LEDGER_DELIMITER: &str = "--------------------------------------------------";
pub const SYSTEM_ERROR_PREFIX: &str = "System error: ";
pub const TIMEOUT_PREFIX: &str = "Timeout: ";
