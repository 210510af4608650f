use frrsyncd_cmd::cmd;

fn main() {
    cmd::run();
}
