#![no_main]

use libfuzzer_sys::fuzz_target;
use tianogen::prelude::*;

fuzz_target!(|data: &[u8]| {
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(registry) = Registry::from_xml(xml) else {
        return;
    };

    let autogen = AutoGen::new(&registry);
    for module in registry.modules() {
        let _ = autogen.render(module, Arch::Ia32, &PcdFragments::default());
    }
});
