fn main() -> std::process::ExitCode {
    summary_box_lib::run()
}
