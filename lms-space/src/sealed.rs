//! Sealed bundle compiled into the binary
//!
//! Used when no bundle file is configured. Produced by `lms-seal` with the
//! default iteration count.

use lms_common::vault::{SealedBundle, KDF_ITERATIONS};

const SALT: &str = "iSCp9OG+hAEneW3wa89/ew==";

const SERVICE_ID: &str = concat!(
    "gAAAAABmVWcj69yZexqsTUWDOri8TQsvqyO36J5Qbm5G1rJEJQ3ePqRtIL9CzNQDQpRsfJa6iCWF",
    "jTUHpdf2g37qPWn7h00Nn7UYKhIkDmQ6NaHrwaLMZd-s7-Nx8Z2MebFe6ilK_yBy",
);

const SERVICE_SECRET: &str = concat!(
    "gAAAAABmVWcjpgtCHRP6qeZfnu_y-6-6BMz3L9pOWDBzpX2Zq1ng5pIXall8Z6GmTlW4BMGHOkP3",
    "CUSVvvVNAU0pEnS0arve8dWOLbcczgJbHMnjiKXQGjDqvA1SmV27UzbXTgtLK79V",
);

const DATASET: &str = concat!(
    "gAAAAABmVWcjVS0wbucdFxW4YXkPQv6z6afksP3CQ5jCSPgXrrjF-GG42szszvnE-HV5DMhHIoHL",
    "_OpqRkvxq1yzk_WdWTMQeZ7X10SELeAOx7unoQkdw901e0TYkoj4f-yp9tazuW0JCiOo8QK_MKI4",
    "VgCviZ-gFLPf8V-AczckQg39qScaUZ0JoRV8RkJieCrKSuzLcqAzEgj-sZvrTC81yLsSLzipHKu_",
    "bx2u6ef-WPCZp0p7jDXhTbvy_Xm8UYvFOEArtNWHzBE3NXR21uk1Zrx2LvIpm2oUPdSqVr0JOWZa",
    "ToJMnK6SfZEbeKvH7dD0XK2KoBcJvi-xhCunwWBoy4hYISn_ld75I8f4DmBnHANYdd-1by1C-AIq",
    "fhLL3aZGbGVRbNIOFuyXfr0dF5IixkO2Y9evIAdhtIZTSXLvrJScR9185ar98o19r5ii_qkux6la",
    "FBIRlU-6QykTSZ6dWY5_xMtsyoWrBYBkruhzZnEcA5RVSW3isox0DdNnITRfeOpkp9D5RxsPZEp5",
    "r2plZIKbJpjCufaNBga_31ovoid9dSAJuSXvGf6Q_JjikxSMYYu78qFWOPm_DYVhgr_sWMs2bkgc",
    "-cWHaLYHxv--h_QIGdIe0K4dlqX0gZ1KvJQZ6a7DUf7XAv5bhcDtrc1ZFlVRYYPl45C9HrfrRG7E",
    "yIB3RxT88O38Mn99a3WVGpl8qJKDDu1WTlLeul-BaAywncf51ehzL49tL8Qhbio4kQVjYNjEOJJb",
    "OemX4M5aJb17hk3X7FeiM1AU6S2-z7UoRuX72BXORJdZIfgrnN9wp4YfLu-c9gjSpkBbjti90ce1",
    "NmsZT7CUJQXNbqGOO5iKBMIUarCmgn0pj3rxWMWp4PzzQm0F_gbLVdNzvrkQ6ddUr8MHBuiaib1V",
    "TeIEuYbId-m1HPyEduM5MGqSRJMo5uWEBOrNwibm5uuGaaWSOibC2Rp-kMHqQJRUKGF2_5svzYuK",
    "rx7fCPWV1xDDyL2SMzvYIfikH-QJRqWUs6gUoVJdkHRCUEw6CqIRGwkxYye_XlVj-LtehW7uAXJf",
    "AYdv90tyAHwwytwtLiZRXQhyce1WHS7FfOmgvasyZs754xH0-pcDgOLU2VeCigS4WuBknIrpJXye",
    "GqrJxKpMxAfmm4SmFy686WUavj7D1dfaZ4xr91ryBLoOk4VusMDlitGBpEkxfiIhA5_8MKbfnwfS",
    "R2WDs-Ygye-ktY6c0kTV92HOyG89h5xS4MjoAaKuyQLBKS-hBIFomDx_z_PuRA4oLhZ6Ax1Uin2M",
    "OLeIPD86Hbh69JCK1w-HW1QAHnXPfd8fEikXpOzekOG2OfM8Wa7l2OPnBfz4N1c9j7bkP_NceCOs",
    "dxu9t2aSfMaTYLxStjJJb6yD0K09yrnfFs0eWzITHfFopW7XHXOvkV4F-yBCrNY3TtUCN8-otaDh",
    "AmQPy9anwiibljJiMQzxEt3djn2vxsyUwKXa2wErZ1KFRKkI13onWHYi1325zSluTWZH2NAMhIPu",
    "HAUF5aliQjtEMqMvIxr2rFmwhB2U5wEZPjNUuwhZueiEsfSgWrS7eSPXMwXueRkkT3Tw25NxraBa",
    "3yT0I60rn7eD6eNU_ibPngPtQAMVyfiRRqeA7flN8QB_ZKfPWybR8KaPZ2GgdqCxfmIBvgsuAfsH",
    "er0xwoym81qH0fgYJ0L_SUr-IGhFrm0PYn956OD6POrpIAl4yk57S6qBCCEdv8_NB96iUvVN6YNo",
    "ETKVKa588XZaxJplMW6-x38IoZV02sbJGwAqndY3THXVCEdxawGdRlsNttlT1YQbIzZroE77nUkh",
    "g77n6Ew5VpNQ5eKh_6AQLoVCiypXN4c_FKpRgfm9IMcjgGvzdqWNa-TKyc1rQfH2WIq61CMnBRhP",
    "GIFmTWr_NnWFQM0MIUkW_n6m-oz-GV7hTenE4LYdNvb4SKcxuUU-vA_bwhhOv3YOzwfzdivWsv5Y",
    "CBY_Nu9ARbg9ZN9vAbq3P0QmCWdj83GLw_xEPPeURT0jY0A15-RyYoeDX65_hBGkSr0Y-EPVIzj0",
    "3j7fQdy00LYrVRCkeYX2iyZd-NuHrtiMuKXE8s3wXKOcrTqZZLMwrw3bEzt_9ySLQI7HopRuA3WW",
    "eUB_xO-iYJHOfW9XqqnOQtlk-6vxAr-Jtl7lBszf69TDTSXlJpFpaoWgwjSkHMzUAUQgEkdA1VqH",
    "W1j8mj5sohb7PKBAACM082cSqJyP6v-ikuTfZZwZEXvKNE0CrkhAQL2HSMDXVi_RpEoceP1EElpg",
    "SdugP6jveoNWsFQKZpmQGjD06mB2iJ-7WHEvsdfc6lN468RUg1Xnm32_52SlWpwC95gDV9z0OvLw",
    "wHvlx4P9bkMmgXLSyrBAKlWNkjcdzBwKe-BISy2JeeXDuAFOX9SNPxZYcoMxH2dsToEgV6Fotydb",
    "WaYbqSoCw_yJcHzdb9ZsNIBhsi8KA2gMele-WM-0LEdew8Z6tM6C01zxPpz5O5W8l4eeL40Mliaa",
    "WTHy7Ez_4zy0e0euB8B4Yy4feytooQFAKzO0_TvO0yLK0mqZ4HZKGfBIWm2OkrnpKuXyLnXqKrz5",
    "eFpmQyQoBG3cdCPjuRHCxIZGQOBA13MXUqfj-hTbqYa_Hhvzy8vh1rfMEIN9bF8mMNrHH01Xc2Xo",
    "456kBjzqoojCzGx9mZ2hsygzRG2Vs8WX009O3anLkTOU9z1IoqNwMk0nWbjvEq2xWl2r-CuYqMfv",
    "XRXvQ15O1xZTGCT5ZtSBRDDqKZXO-SMN6ABG3HX8imaiA_S2mqyUEjXTAq1eYn9ZCk5eVhGoTrGd",
    "cSRZSwNk12an54k7F74cnREj6zH1rzul8So4w67mK2AgduURJ746oD0mkv3VTmYCH9wVbTwcGirM",
    "O_ZKLZnoEMYcz183BpjgwIwZQnb7m9hcjBO3Ct7mB7wHTyuOFh0cd85epWQxksCud-7ensSGFPmB",
    "A3kV5hKu3LisMrM3v1U-J-bf8jJ8KWk_5d5LvX4AinluIakCx6JdZWFWdEJawkhMeq9s_WRqP_Tm",
    "qdKvpSdDiivAP9M8IvrDEGQYrZXmhxvaZKRocl9_ZR1MtKuSAN9f7nd-au2I3Gf5Z0mx18h0NvUf",
    "LiazoWyw2UU7hHU6t_F1NF95XSxN92zh1CCU9Flzi0Xj77HJYZexVctMPCb3LNRQY78ap3WTqOyn",
    "SoDSeYGU-k8ps3GEN1DZTaTJJMyqOIsopeJM0XiJ4eDPBDugS6LBphy1alm_i3Q702XYLEafCZv9",
    "oDDfRnh9rcwZK8pZJLzvZYe_4k6lrjjRQssAUVyiqQ0bqdN7xknvcMnf7tnvGbfHJpBBFqHGUlb0",
    "zXUuaonIcSQXnQAylfEigUDsYlJvirmgS_CUcigJ83_WH1ebaqfAAYxTDv2UgBWTh_uY6pLA5fBQ",
    "LZJrJg==",
);

/// Bundle shipped with the binary
pub fn default_bundle() -> SealedBundle {
    SealedBundle {
        salt: SALT.to_string(),
        iterations: KDF_ITERATIONS,
        service_id: SERVICE_ID.to_string(),
        service_secret: SERVICE_SECRET.to_string(),
        dataset: DATASET.to_string(),
    }
}
