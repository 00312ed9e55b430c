mod kanjidic2_tests;
