#[macro_export]
macro_rules! emergency {
    ($content:expr) => {
        $crate::get_global_logger().send(
            $crate::LogLevel::Emergency,
            $content,
            None,
            $crate::CallSite::new(Some(file!()), Some(module_path!()), Some(line!())),
        )
    };
}

#[macro_export]
macro_rules! alert {
    ($content:expr) => {
        $crate::get_global_logger().send(
            $crate::LogLevel::Alert,
            $content,
            None,
            $crate::CallSite::new(Some(file!()), Some(module_path!()), Some(line!())),
        )
    };
}

#[macro_export]
macro_rules! critical {
    ($content:expr) => {
        $crate::get_global_logger().send(
            $crate::LogLevel::Critical,
            $content,
            None,
            $crate::CallSite::new(Some(file!()), Some(module_path!()), Some(line!())),
        )
    };
}

#[macro_export]
macro_rules! error {
    ($content:expr) => {
        $crate::get_global_logger().send(
            $crate::LogLevel::Error,
            $content,
            None,
            $crate::CallSite::new(Some(file!()), Some(module_path!()), Some(line!())),
        )
    };
}

#[macro_export]
macro_rules! warning {
    ($content:expr) => {
        $crate::get_global_logger().send(
            $crate::LogLevel::Warning,
            $content,
            None,
            $crate::CallSite::new(Some(file!()), Some(module_path!()), Some(line!())),
        )
    };
}

#[macro_export]
macro_rules! notice {
    ($content:expr) => {
        $crate::get_global_logger().send(
            $crate::LogLevel::Notice,
            $content,
            None,
            $crate::CallSite::new(Some(file!()), Some(module_path!()), Some(line!())),
        )
    };
}

#[macro_export]
macro_rules! info {
    ($content:expr) => {
        $crate::get_global_logger().send(
            $crate::LogLevel::Information,
            $content,
            None,
            $crate::CallSite::new(Some(file!()), Some(module_path!()), Some(line!())),
        )
    };
}

#[macro_export]
macro_rules! debug {
    ($content:expr) => {
        $crate::get_global_logger().send(
            $crate::LogLevel::Debug,
            $content,
            None,
            $crate::CallSite::new(Some(file!()), Some(module_path!()), Some(line!())),
        )
    };
}

#[macro_export]
macro_rules! verbose {
    ($content:expr) => {
        $crate::get_global_logger().send(
            $crate::LogLevel::Verbose,
            $content,
            None,
            $crate::CallSite::new(Some(file!()), Some(module_path!()), Some(line!())),
        )
    };
}
