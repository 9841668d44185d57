use apiload::error::AppResult;

fn main() -> AppResult<()> {
    apiload::entry::run()
}
