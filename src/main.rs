fn main() {
    koskinon::cli::run();
}
