fn main() -> std::process::ExitCode {
    scene_lens_lib::run()
}
