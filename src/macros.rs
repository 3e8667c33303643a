#[macro_export]
macro_rules! unlock {
    ($e: expr) => {{
        $e.lock().unwrap()
    }};
}
